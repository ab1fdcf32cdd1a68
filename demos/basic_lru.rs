use boundcache::engine::LruCache;
use boundcache::options::CacheOptions;

fn main() {
    let cache: LruCache<u32, String> = LruCache::new(CacheOptions::default().with_max_elements(2));

    cache.set(1, "alpha".to_string());
    cache.set(2, "beta".to_string());

    if let Some(value) = cache.get(&1) {
        println!("hit 1: {}", value.as_str());
    }

    cache.set(3, "gamma".to_string());

    println!("contains 2? {}", cache.contains(&2));
    println!("size: {} bytes in {} entries", cache.size(), cache.elements_count());
}

// Expected output:
// hit 1: alpha
// contains 2? false
// size: 10 bytes in 2 entries
//
// Explanation: max_elements=2; after get(&1), key 1 is most recent and key 2
// is least recent. Setting key 3 evicts key 2. Sizes are string lengths.
