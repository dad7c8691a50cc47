use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FusionFlow API",
        version = "0.3.0",
        description = r#"
# FusionFlow Order & Shipment Tracking API

Backend for tracking purchase orders, shipments, suppliers and customs
clearance across projects.

## Authentication

All endpoints except `POST /api/v1/auth/login` and the health probes
require a JWT bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Pagination

List endpoints take `page` (default 1) and `per_page` (default 20,
max 100) query parameters.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Login and session endpoints"),
        (name = "orders", description = "Purchase order lifecycle"),
        (name = "shipments", description = "Shipment tracking and status history"),
        (name = "projects", description = "Project management"),
        (name = "suppliers", description = "Supplier registry and performance"),
        (name = "users", description = "Accounts, assignments, notifications and audit log"),
        (name = "documents", description = "Document metadata registry"),
        (name = "customs", description = "Customs clearance entries"),
        (name = "settings", description = "System settings"),
        (name = "dashboard", description = "Landing-page statistics")
    ),
    paths(
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::me,
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::list_order_shipments,
        crate::handlers::orders::list_order_costs,
        crate::handlers::orders::add_order_cost,
        crate::handlers::shipments::create_shipment,
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::update_shipment,
        crate::handlers::shipments::update_shipment_status,
        crate::handlers::shipments::get_shipment_history,
        crate::handlers::shipments::track_shipment,
        crate::handlers::shipments::list_shipment_customs,
        crate::handlers::shipments::create_customs_entry,
        crate::handlers::projects::create_project,
        crate::handlers::projects::list_projects,
        crate::handlers::projects::get_project,
        crate::handlers::projects::update_project,
        crate::handlers::projects::delete_project,
        crate::handlers::projects::list_project_orders,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,
        crate::handlers::suppliers::list_performance,
        crate::handlers::suppliers::record_performance,
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::change_password,
        crate::handlers::users::assign_user,
        crate::handlers::users::my_assignments,
        crate::handlers::users::list_unread_notifications,
        crate::handlers::users::mark_notifications_read,
        crate::handlers::users::list_notifications,
        crate::handlers::users::list_audit_logs,
        crate::handlers::documents::register_document,
        crate::handlers::documents::list_documents,
        crate::handlers::documents::delete_document,
        crate::handlers::customs::update_customs_entry,
        crate::handlers::settings::list_settings,
        crate::handlers::settings::get_setting,
        crate::handlers::settings::upsert_setting,
        crate::handlers::dashboard::stats,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::auth::AccessToken,
            crate::handlers::auth::LoginResponse,
            crate::handlers::orders::CostBreakdownSummary,
            crate::handlers::shipments::ShipmentWithHistory,
            crate::handlers::users::UnreadNotification,
            crate::handlers::users::UnreadNotificationsResponse,
            crate::services::users::LoginRequest,
            crate::services::users::CreateUserRequest,
            crate::services::users::UpdateUserRequest,
            crate::services::users::ChangePasswordRequest,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::orders::UpdateOrderStatusRequest,
            crate::services::shipments::CreateShipmentRequest,
            crate::services::shipments::UpdateShipmentRequest,
            crate::services::shipments::UpdateShipmentStatusRequest,
            crate::services::projects::CreateProjectRequest,
            crate::services::projects::UpdateProjectRequest,
            crate::services::suppliers::CreateSupplierRequest,
            crate::services::suppliers::UpdateSupplierRequest,
            crate::services::suppliers::RecordPerformanceRequest,
            crate::services::assignments::AssignmentTargets,
            crate::services::assignments::AssignmentOutcome,
            crate::services::assignments::UserAssignments,
            crate::services::customs::CreateCustomsEntryRequest,
            crate::services::customs::UpdateCustomsEntryRequest,
            crate::services::costs::AddCostLineRequest,
            crate::services::documents::RegisterDocumentRequest,
            crate::services::settings::UpsertSettingRequest,
            crate::services::dashboard::DashboardStats,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_core_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("FusionFlow API"));
        assert!(json.contains("/api/v1/orders/{id}/status"));
        assert!(json.contains("/api/v1/shipments/{id}/update-status"));
        assert!(json.contains("/api/v1/users/{id}/assign"));
        assert!(json.contains("/api/v1/users/assignments"));
        assert!(json.contains("/api/v1/projects/{id}/orders"));
        assert!(json.contains("bearer_auth"));
    }
}
