/// A macro to simplify read-through caching against the in-memory store.
///
/// This macro checks if a value is present in the cache.
/// If found, it returns the cached value.
/// If not found, it executes the provided block to compute the value,
/// stores it in the cache, and then returns the computed value.
///
/// The cache lookup and insertion are synchronous; only the compute block is
/// awaited, so no cache lock is ever held across the upstream call.
///
/// # Arguments
/// * `$cache`: The [`CacheStore`](crate::cache::CacheStore) to consult.
/// * `$key`: The [`CacheKey`](crate::cache::CacheKey) for the value.
/// * `$ttl`: The time-to-live for a freshly computed value.
/// * `$block`: The async block to execute on a cache miss.
///
/// # Example
/// ```rust,ignore
/// let items: AppResult<Vec<MediaItem>> = cached!(cache, key, ttl, async move {
///     fetch_from_catalog().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        // Attempt to get the value from cache
        if let Some(cached) = $cache.get(&$key) {
            Ok(cached)
        } else {
            // If not in cache, execute the block to compute the value
            let value = $block.await?;
            // Store the computed value in cache
            $cache.set(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
