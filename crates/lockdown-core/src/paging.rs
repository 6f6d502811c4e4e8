//! Retrieval of a complete paged collection.

use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::config::MAX_PAGE_SIZE;
use crate::error::AppError;
use crate::models::{page_count, Page, Project};

/// Every project the service listed, flattened in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub projects: Vec<Project>,
    /// Total announced by the first page.
    pub total: usize,
    /// Number of pages covering `total`.
    pub pages: u32,
}

/// Fetches every page of a listing and concatenates the results.
///
/// Page 1 is fetched first to learn the total; its result is kept and the
/// remaining pages are fetched concurrently, at most `concurrency` at a time
/// (all at once when `None`). Page order is preserved in the output and the
/// order inside each page is kept verbatim.
///
/// Any failing page aborts the whole collection: the remaining in-flight
/// fetches are dropped and the error is returned.
///
/// # Examples
///
/// ```
/// use lockdown_core::models::{Page, Paging};
/// use lockdown_core::paging::collect_pages;
/// use lockdown_core::AppError;
///
/// # async fn example() -> Result<(), AppError> {
/// let collection = collect_pages(500, None, |index| async move {
///     Ok::<_, AppError>(Page {
///         paging: Paging { page_index: index, page_size: 500, total: 0 },
///         projects: Vec::new(),
///     })
/// })
/// .await?;
/// assert!(collection.projects.is_empty());
/// # Ok(())
/// # }
/// ```
pub async fn collect_pages<F, Fut>(
    page_size: u32,
    concurrency: Option<usize>,
    fetch: F,
) -> Result<Collection, AppError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Page, AppError>>,
{
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::InvalidConfig(format!(
            "page size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, page_size
        )));
    }

    let first = fetch(1).await?;
    let total = first.paging.total;
    let pages = page_count(total, page_size);

    if total == 0 {
        return Ok(Collection::default());
    }
    log_page(&first, 1);

    let mut projects = Vec::with_capacity(total);
    projects.extend(first.projects);

    if pages > 1 {
        let limit = concurrency.unwrap_or(pages as usize - 1).max(1);
        let rest: Vec<Page> = stream::iter(2..=pages)
            .map(|index| {
                let page = fetch(index);
                async move {
                    let page = page.await?;
                    log_page(&page, index);
                    Ok::<_, AppError>(page)
                }
            })
            .buffered(limit)
            .try_collect()
            .await?;

        for page in rest {
            projects.extend(page.projects);
        }
    }

    if projects.len() != total {
        warn!(
            "Listing announced {} projects but {} were returned; the collection changed while paging",
            total,
            projects.len()
        );
    }

    Ok(Collection {
        projects,
        total,
        pages,
    })
}

fn log_page(page: &Page, index: u32) {
    info!("Fetched {} projects (page {})", page.projects.len(), index);
}
