//! Example demonstrating runtime policy selection with CacheBuilder.
//!
//! Run with: cargo run --example basic_builder -- lfu

use boundcache::builder::{CacheBuilder, CachePolicy};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let policy: CachePolicy = match std::env::args().nth(1).map(|arg| arg.parse()) {
        Some(Ok(policy)) => policy,
        Some(Err(err)) => {
            eprintln!("{err}");
            std::process::exit(2);
        },
        None => CachePolicy::default(),
    };

    println!("=== CacheBuilder ({policy}) ===\n");

    // Example 1: element limit
    println!("1. Element limit");
    let cache = CacheBuilder::new()
        .max_elements(3)
        .policy(policy)
        .build::<u64, String>();

    cache.set(1, "one".to_string());
    cache.set(2, "two".to_string());
    cache.set(3, "three".to_string());

    // Read key 1 so it is both most recent and most frequent
    cache.get(&1);

    cache.set(4, "four".to_string());

    println!("   contains 1? {} (was read)", cache.contains(&1));
    println!("   contains 2? {} (evicted)", cache.contains(&2));
    println!("   contains 4? {} (just set)", cache.contains(&4));
    println!();

    // Example 2: byte limit
    println!("2. Byte limit");
    let cache = CacheBuilder::new()
        .capacity(16)
        .policy(policy)
        .build::<&str, Vec<u8>>();

    cache.set("small", vec![0; 4]);
    cache.set("medium", vec![0; 8]);
    cache.set("large", vec![0; 8]);

    println!("   size: {} bytes", cache.size());
    println!("   contains small? {}", cache.contains(&"small"));
    println!("   full? {}", cache.full());
    println!();

    // Example 3: shrinking the limit at runtime
    println!("3. Shrinking the limit");
    cache.set_capacity(8);
    println!("   entries left: {}", cache.elements_count());
    println!("   metrics: {:?}", cache.metrics());
}
