//! Category grouping of fragments.
//!
//! Buckets are built twice per run: over every discovered fragment to drive
//! the selector display, and over the selected subset to drive assembly.

use std::collections::HashMap;

use tracing::{debug, instrument};

use clinerules_shared::{CategoryBucket, Fragment};

/// Partition fragments into category buckets, in first-seen order.
///
/// Every fragment lands in exactly one bucket; within a bucket, fragments
/// keep their input order.
#[instrument(level = "debug", skip_all)]
pub fn group_by_category<'a, I>(fragments: I) -> Vec<CategoryBucket<'a>>
where
    I: IntoIterator<Item = &'a Fragment>,
{
    let mut buckets: Vec<CategoryBucket<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for fragment in fragments {
        let category = fragment.category();
        match index.get(category) {
            Some(&i) => buckets[i].fragments.push(fragment),
            None => {
                index.insert(category, buckets.len());
                buckets.push(CategoryBucket {
                    category: category.to_string(),
                    fragments: vec![fragment],
                });
            }
        }
    }

    debug!(buckets = buckets.len(), "fragments grouped");
    buckets
}

/// Reorder buckets for display: categories named in `preference` first, in
/// that order, then every other category in first-seen order.
///
/// Empty buckets are dropped.
pub fn display_order<'a>(
    buckets: Vec<CategoryBucket<'a>>,
    preference: &[String],
) -> Vec<CategoryBucket<'a>> {
    let mut remaining: Vec<Option<CategoryBucket<'a>>> =
        buckets.into_iter().filter(|b| !b.fragments.is_empty()).map(Some).collect();

    let mut ordered = Vec::with_capacity(remaining.len());
    for wanted in preference {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|b| &b.category == wanted))
        {
            ordered.extend(slot.take());
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}

/// Stable-sort each bucket by `order` ascending.
///
/// Ties keep their bucket order, which is discovery order for display buckets
/// and selection order for output buckets.
pub fn sort_buckets(buckets: &mut [CategoryBucket<'_>]) {
    for bucket in buckets {
        bucket.fragments.sort_by_key(|f| f.order());
    }
}
