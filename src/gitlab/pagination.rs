// Page accumulation for GitLab list endpoints.
// Keeps requesting pages from 1 until the server reports the terminal page.

use std::future::Future;

use reqwest::header::HeaderMap;

use crate::error::Result;

/// Items requested per page.
pub const PER_PAGE: u32 = 100;

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    /// Absent when the server omits `X-Total-Pages` (very large collections).
    pub total_pages: Option<u32>,
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// Build a page from GitLab's pagination headers.
    ///
    /// Missing headers mean a single unpaginated response.
    pub fn from_headers(items: Vec<T>, headers: &HeaderMap, requested: u32) -> Self {
        let current_page = header_u32(headers, "x-page").unwrap_or(requested);
        Self {
            items,
            current_page,
            total_pages: header_u32(headers, "x-total-pages"),
            next_page: header_u32(headers, "x-next-page"),
        }
    }

    /// Whether no further page should be requested after this one.
    pub fn is_last(&self) -> bool {
        if self
            .total_pages
            .is_some_and(|total| self.current_page >= total)
        {
            return true;
        }
        match self.next_page {
            Some(next) => next <= self.current_page,
            None => true,
        }
    }
}

/// Parse a numeric header; GitLab sends an empty `X-Next-Page` on the last page.
fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Request every page starting at 1 and concatenate the items in order.
///
/// Re-runs from page 1 on every call. The first error aborts the whole listing.
pub async fn collect_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let mut current = fetch_page(page).await?;
        items.append(&mut current.items);

        if current.is_last() {
            break;
        }
        // is_last guarantees next_page is ahead of current_page here
        page = match current.next_page {
            Some(next) => next,
            None => break,
        };
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlError;
    use reqwest::header::HeaderValue;
    use std::cell::Cell;

    /// Simulated server that splits `items` into pages of `page_size`.
    fn paged<T: Clone>(items: &[T], page_size: usize, page: u32) -> Page<T> {
        let chunks: Vec<Vec<T>> = items.chunks(page_size).map(|c| c.to_vec()).collect();
        let total = chunks.len() as u32;
        let index = page.saturating_sub(1) as usize;
        Page {
            items: chunks.get(index).cloned().unwrap_or_default(),
            current_page: page,
            total_pages: Some(total),
            next_page: (page < total).then_some(page + 1),
        }
    }

    #[tokio::test]
    async fn test_collects_every_page_in_order() {
        let calls = Cell::new(0);
        let source: Vec<u32> = (1..=7).collect();

        let result = collect_all_pages(|page| {
            calls.set(calls.get() + 1);
            let page = paged(&source, 3, page);
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(result, source);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_single_page_issues_one_call() {
        let calls = Cell::new(0);
        let source = vec!["only"];

        let result = collect_all_pages(|page| {
            calls.set(calls.get() + 1);
            let page = paged(&source, 100, page);
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(result, vec!["only"]);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_zero_total_pages_terminates() {
        let calls = Cell::new(0);

        let result: Vec<u32> = collect_all_pages(|page| {
            calls.set(calls.get() + 1);
            async move {
                Ok(Page {
                    items: Vec::new(),
                    current_page: page,
                    total_pages: Some(0),
                    next_page: Some(page + 1),
                })
            }
        })
        .await
        .unwrap();

        assert!(result.is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_three_pipelines_over_two_pages() {
        let calls = Cell::new(0);
        let pipelines = vec![103u64, 102, 101];

        let result = collect_all_pages(|page| {
            calls.set(calls.get() + 1);
            let page = paged(&pipelines, 2, page);
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(result, vec![103, 102, 101]);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_follows_next_page_without_total() {
        let result = collect_all_pages(|page| async move {
            Ok(Page {
                items: vec![page],
                current_page: page,
                total_pages: None,
                next_page: (page < 4).then_some(page + 1),
            })
        })
        .await
        .unwrap();

        assert_eq!(result, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_error_aborts_listing() {
        let result: Result<Vec<u32>> = collect_all_pages(|page| async move {
            if page == 2 {
                Err(GlError::Timeout)
            } else {
                Ok(Page {
                    items: vec![page],
                    current_page: page,
                    total_pages: Some(3),
                    next_page: Some(page + 1),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(GlError::Timeout)));
    }

    #[test]
    fn test_page_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-page", HeaderValue::from_static("2"));
        headers.insert("x-total-pages", HeaderValue::from_static("3"));
        headers.insert("x-next-page", HeaderValue::from_static("3"));

        let page = Page::from_headers(vec![1, 2], &headers, 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, Some(3));
        assert_eq!(page.next_page, Some(3));
        assert!(!page.is_last());

        let mut last = HeaderMap::new();
        last.insert("x-page", HeaderValue::from_static("3"));
        last.insert("x-total-pages", HeaderValue::from_static("3"));
        last.insert("x-next-page", HeaderValue::from_static(""));
        let page = Page::from_headers(vec![3], &last, 3);
        assert_eq!(page.next_page, None);
        assert!(page.is_last());

        let page = Page::from_headers(vec![1], &HeaderMap::new(), 1);
        assert!(page.is_last());
    }
}
