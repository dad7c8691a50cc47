pub mod auth;
pub mod common;
pub mod customs;
pub mod dashboard;
pub mod documents;
pub mod orders;
pub mod projects;
pub mod settings;
pub mod shipments;
pub mod suppliers;
pub mod users;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<crate::auth::AuthService>,
    pub audit: crate::services::audit::AuditService,
    pub users: crate::services::users::UserService,
    pub projects: crate::services::projects::ProjectService,
    pub suppliers: crate::services::suppliers::SupplierService,
    pub orders: crate::services::orders::OrderService,
    pub shipments: crate::services::shipments::ShipmentService,
    pub assignments: crate::services::assignments::AssignmentService,
    pub notifications: crate::services::notifications::NotificationService,
    pub customs: crate::services::customs::CustomsService,
    pub costs: crate::services::costs::CostService,
    pub documents: crate::services::documents::DocumentService,
    pub settings: crate::services::settings::SettingsService,
    pub dashboard: crate::services::dashboard::DashboardService,
}

impl AppServices {
    /// Wire up every service against one pool and one event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        let auth = Arc::new(crate::auth::AuthService::new(crate::auth::AuthConfig::from(
            config,
        )));
        let audit = crate::services::audit::AuditService::new(db_pool.clone());
        let users = crate::services::users::UserService::new(
            db_pool.clone(),
            auth.clone(),
            audit.clone(),
            event_sender.clone(),
        );
        let projects = crate::services::projects::ProjectService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.default_currency.clone(),
        );
        let suppliers = crate::services::suppliers::SupplierService::new(
            db_pool.clone(),
            event_sender.clone(),
        );
        let orders = crate::services::orders::OrderService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.default_currency.clone(),
        );
        let shipments = crate::services::shipments::ShipmentService::new(
            db_pool.clone(),
            event_sender.clone(),
        );
        let assignments = crate::services::assignments::AssignmentService::new(
            db_pool.clone(),
            event_sender.clone(),
        );
        let notifications = crate::services::notifications::NotificationService::new(db_pool.clone());
        let customs =
            crate::services::customs::CustomsService::new(db_pool.clone(), event_sender.clone());
        let costs = crate::services::costs::CostService::new(db_pool.clone());
        let documents = crate::services::documents::DocumentService::new(db_pool.clone());
        let settings = crate::services::settings::SettingsService::new(db_pool.clone());
        let dashboard = crate::services::dashboard::DashboardService::new(db_pool);

        Self {
            auth,
            audit,
            users,
            projects,
            suppliers,
            orders,
            shipments,
            assignments,
            notifications,
            customs,
            costs,
            documents,
            settings,
            dashboard,
        }
    }
}
