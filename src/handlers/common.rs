use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::services::users::ClientInfo;
use crate::PaginatedResponse;

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Page numbers are one-based; clamp so `page=0` reads as the first page.
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.clamp(1, 100)
    }
}

pub fn paginated<T>(items: Vec<T>, total: u64, params: &PaginationParams) -> PaginatedResponse<T> {
    let per_page = params.per_page();
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };
    PaginatedResponse {
        items,
        total,
        page: params.page(),
        limit: per_page,
        total_pages,
    }
}

/// Best-effort caller identity for the audit trail. Proxy-forwarded
/// addresses take the first hop.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string());
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    ClientInfo {
        ip_address,
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_degenerate_input() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 1);

        let params = PaginationParams {
            page: 3,
            per_page: 500,
        };
        assert_eq!(params.per_page(), 100);
    }

    #[test]
    fn paginated_computes_page_count() {
        let params = PaginationParams {
            page: 2,
            per_page: 10,
        };
        let response = paginated(vec![1, 2, 3], 23, &params);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.page, 2);
        assert_eq!(response.limit, 10);
    }

    #[test]
    fn client_info_reads_forwarded_chain() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 172.16.0.1".parse().unwrap());
        headers.insert(
            axum::http::header::USER_AGENT,
            "integration-test".parse().unwrap(),
        );
        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(info.user_agent.as_deref(), Some("integration-test"));
    }
}
