use boundcache::engine::LfuCache;
use boundcache::options::CacheOptions;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cache: LfuCache<&str, String> = LfuCache::new(CacheOptions::default().with_max_elements(2));

    cache.set("a", "alpha".to_string());
    cache.set("b", "beta".to_string());

    cache.get(&"a");
    cache.set("c", "gamma".to_string());

    println!("contains a? {}", cache.contains(&"a"));
    println!("contains b? {}", cache.contains(&"b"));
    println!("evicted: {}", cache.metrics().evictions);
}

// Expected output:
// contains a? true
// contains b? false
// evicted: 1
//
// Explanation: max_elements=2; "a" is read before "c" arrives, so "b" and "c"
// share the lowest frequency. "b" arrived first and is evicted.
// Run with RUST_LOG=boundcache=trace to see the eviction events.
