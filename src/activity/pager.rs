//! Page-by-page traversal of list endpoints.

use crate::Result;

const LOG_TARGET: &str = "activity::pager";

/// Fetch consecutive pages of `collection` until a page comes back empty,
/// flattening the results.
///
/// Page numbers start at 1. Traversal also stops once `max_pages` pages have
/// been fetched; hitting the ceiling is reported as a warning rather than an
/// error, so a pathological or unbounded listing degrades to a truncated
/// result instead of an endless crawl.
pub async fn fetch_all_pages<T, F, Fut>(collection: &str, max_pages: u32, mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut results = Vec::new();
    let mut page = 1;
    loop {
        let items = fetch_page(page).await?;
        if items.is_empty() {
            break;
        }

        results.extend(items);
        if page >= max_pages {
            log::warn!(target: LOG_TARGET,
                "stopping traversal of {collection} at the {max_pages} page ceiling, results may be incomplete");
            break;
        }

        page += 1;
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        // A full page followed by an empty one: exactly two fetches, and the
        // result is the full page.
        let full: Vec<u32> = (0..100).collect();
        let pages = [full.clone(), vec![]];
        let mut calls = 0;

        let result = fetch_all_pages("numbers", 99, |page| {
            calls += 1;
            let items = pages[(page - 1) as usize].clone();
            async move { Ok(items) }
        })
        .await
        .unwrap();

        assert_eq!(result, full);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_flattens_multiple_pages() {
        let pages = [vec![1, 2], vec![3, 4], vec![5], vec![]];

        let result = fetch_all_pages("numbers", 99, |page| {
            let items = pages[(page - 1) as usize].clone();
            async move { Ok(items) }
        })
        .await
        .unwrap();

        assert_eq!(result, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_stops_at_page_ceiling() {
        let mut calls = 0;

        // Every page is full, so only the ceiling can stop the traversal.
        let result = fetch_all_pages("numbers", 3, |_| {
            calls += 1;
            async { Ok(vec![0; 100]) }
        })
        .await
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(result.len(), 300);
    }

    #[tokio::test]
    async fn test_propagates_fetch_errors() {
        let result: Result<Vec<i32>> =
            fetch_all_pages("numbers", 99, |_| async { Err(app_err!("boom")) }).await;

        assert!(result.is_err());
    }
}
