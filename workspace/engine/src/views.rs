//! Derived views: pure functions over an already-fetched request set.
//!
//! Callers apply the visibility scope first (see
//! [`crate::lifecycle::visible_requests`]); these functions only narrow
//! the given slice and never reorder it, so the store's newest-first
//! order is preserved.

use common::{DateRange, StatusCounts};
use model::entities::design_request::{Model as DesignRequest, RequestStatus};

/// Designer filter value matching requests that nobody has claimed yet.
pub const UNASSIGNED: &str = "Unassigned";

/// Filters applied to the dashboard listing.
#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    /// Case-insensitive substring match on outlet name or design type
    pub query: Option<String>,
    /// Exact status match
    pub status: Option<RequestStatus>,
    /// Exact designer match; [`UNASSIGNED`] matches an empty assignment
    pub designer: Option<String>,
}

fn matches_query(request: &DesignRequest, query: Option<&str>) -> bool {
    let Some(query) = query else { return true };
    let needle = query.to_lowercase();
    request.outlet_name.to_lowercase().contains(&needle)
        || request.design_type.to_lowercase().contains(&needle)
}

fn matches_designer(request: &DesignRequest, designer: &str) -> bool {
    if designer == UNASSIGNED {
        request
            .designer_name
            .as_deref()
            .map_or(true, |name| name.is_empty())
    } else {
        request.designer_name.as_deref() == Some(designer)
    }
}

/// The dashboard view: text query, status and designer filters.
pub fn dashboard(requests: Vec<DesignRequest>, filter: &DashboardFilter) -> Vec<DesignRequest> {
    requests
        .into_iter()
        .filter(|request| {
            matches_query(request, filter.query.as_deref())
                && filter
                    .status
                    .map_or(true, |status| request.status == status)
                && filter
                    .designer
                    .as_deref()
                    .map_or(true, |designer| matches_designer(request, designer))
        })
        .collect()
}

/// The history view: completed requests inside an inclusive creation-date
/// range, narrowed by the same text query as the dashboard.
pub fn history(
    requests: Vec<DesignRequest>,
    range: &DateRange,
    query: Option<&str>,
) -> Vec<DesignRequest> {
    requests
        .into_iter()
        .filter(|request| {
            request.status == RequestStatus::Done
                && range.contains(request.created_at)
                && matches_query(request, query)
        })
        .collect()
}

/// Distinct non-empty designer names, sorted lexicographically.
/// Populates the designer filter control.
pub fn designer_roster(requests: &[DesignRequest]) -> Vec<String> {
    let mut names: Vec<String> = requests
        .iter()
        .filter_map(|request| request.designer_name.clone())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Per-status totals for the dashboard stat cards.
pub fn status_counts(requests: &[DesignRequest]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: requests.len() as u64,
        ..Default::default()
    };
    for request in requests {
        match request.status {
            RequestStatus::Pending => counts.pending += 1,
            RequestStatus::InProgress => counts.in_progress += 1,
            RequestStatus::Done => counts.done += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn request(
        outlet: &str,
        design_type: &str,
        status: RequestStatus,
        designer: Option<&str>,
        created: (i32, u32, u32, u32),
    ) -> DesignRequest {
        let (y, m, d, h) = created;
        DesignRequest {
            id: format!("{outlet}-{design_type}"),
            outlet_name: outlet.to_string(),
            design_type: design_type.to_string(),
            dimensions: "1080x1080".to_string(),
            elements: "logo".to_string(),
            reference_url: String::new(),
            status,
            designer_name: designer.map(str::to_string),
            result_file_name: None,
            result_file_url: None,
            created_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
            requestor_username: "alice".to_string(),
        }
    }

    fn sample_set() -> Vec<DesignRequest> {
        vec![
            request(
                "Kopi Kenangan",
                "Banner",
                RequestStatus::Pending,
                None,
                (2024, 2, 1, 9),
            ),
            request(
                "Warung Sederhana",
                "Menu",
                RequestStatus::InProgress,
                Some("bob"),
                (2024, 1, 31, 23),
            ),
            request(
                "Kopi Tuku",
                "Social Media",
                RequestStatus::Done,
                Some("carol"),
                (2024, 1, 15, 12),
            ),
        ]
    }

    #[test]
    fn query_matches_outlet_or_design_type_case_insensitively() {
        let filter = DashboardFilter {
            query: Some("kopi".to_string()),
            ..Default::default()
        };
        let matched = dashboard(sample_set(), &filter);
        assert_eq!(matched.len(), 2);

        let filter = DashboardFilter {
            query: Some("MENU".to_string()),
            ..Default::default()
        };
        let matched = dashboard(sample_set(), &filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].outlet_name, "Warung Sederhana");
    }

    #[test]
    fn status_and_designer_filters_are_exact() {
        let filter = DashboardFilter {
            status: Some(RequestStatus::InProgress),
            designer: Some("bob".to_string()),
            ..Default::default()
        };
        let matched = dashboard(sample_set(), &filter);
        assert_eq!(matched.len(), 1);

        let filter = DashboardFilter {
            designer: Some("dave".to_string()),
            ..Default::default()
        };
        assert!(dashboard(sample_set(), &filter).is_empty());
    }

    #[test]
    fn unassigned_matches_missing_designer() {
        let filter = DashboardFilter {
            designer: Some(UNASSIGNED.to_string()),
            ..Default::default()
        };
        let matched = dashboard(sample_set(), &filter);
        assert_eq!(matched.len(), 1);
        assert!(matched[0].designer_name.is_none());
    }

    #[test]
    fn dashboard_preserves_input_order() {
        let matched = dashboard(sample_set(), &DashboardFilter::default());
        let outlets: Vec<&str> = matched.iter().map(|r| r.outlet_name.as_str()).collect();
        assert_eq!(outlets, ["Kopi Kenangan", "Warung Sederhana", "Kopi Tuku"]);
    }

    #[test]
    fn history_keeps_only_done_requests_in_range() {
        let date = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let range = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));

        let mut requests = sample_set();
        // A Done request created at 23:00 on the last day of the range
        requests.push(request(
            "Late Finisher",
            "Flyer",
            RequestStatus::Done,
            Some("bob"),
            (2024, 1, 31, 23),
        ));
        // A Done request created outside the range
        requests.push(request(
            "Too Recent",
            "Flyer",
            RequestStatus::Done,
            Some("bob"),
            (2024, 2, 1, 0),
        ));

        let matched = history(requests, &range, None);
        let outlets: Vec<&str> = matched.iter().map(|r| r.outlet_name.as_str()).collect();
        assert_eq!(outlets, ["Kopi Tuku", "Late Finisher"]);
    }

    #[test]
    fn history_applies_the_text_query() {
        let matched = history(sample_set(), &DateRange::default(), Some("tuku"));
        assert_eq!(matched.len(), 1);
        let matched = history(sample_set(), &DateRange::default(), Some("warung"));
        assert!(matched.is_empty());
    }

    #[test]
    fn roster_is_distinct_sorted_and_skips_unassigned() {
        let mut requests = sample_set();
        requests.push(request(
            "Another",
            "Banner",
            RequestStatus::Done,
            Some("bob"),
            (2024, 1, 2, 8),
        ));
        assert_eq!(designer_roster(&requests), ["bob", "carol"]);
    }

    #[test]
    fn counts_cover_every_status() {
        let counts = status_counts(&sample_set());
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.done, 1);
    }
}
