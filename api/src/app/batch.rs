//! Sequential batches of concurrent work
//!
//! Items are split into chunks of `width`. Chunks run one after another and
//! the futures inside a chunk run concurrently, so at most `width` are in
//! flight at any time.

use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

/// Run `f` over `items` in batches of `width`, preserving input order in the output
pub async fn run_in_batches<T, R, F, Fut>(items: Vec<T>, width: usize, f: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    run_in_paced_batches(items, width, Duration::ZERO, f).await
}

/// Like [`run_in_batches`], sleeping `delay` between consecutive batches
pub async fn run_in_paced_batches<T, R, F, Fut>(
    items: Vec<T>,
    width: usize,
    delay: Duration,
    mut f: F,
) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let width = width.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        let batch: Vec<Fut> = items.by_ref().take(width).map(&mut f).collect();
        results.extend(join_all(batch).await);

        if !delay.is_zero() && items.peek().is_some() {
            tokio::time::sleep(delay).await;
        }
    }

    results
}
