use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    handler::{
        self,
        accounts::{ProfileResponse, UpdateProfile},
        auth::password::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        bills::{BillResponse, CreateBill, UpdateBill},
        health::Health,
        payments::{PaymentListResponse, PaymentResponse},
        properties::{CreateProperty, PropertyResponse, UnitResponse, UpdateProperty},
        session::MeResponse,
        subscription::{ChangePlan, PlanResponse, SubscriptionResponse},
        tenants::{CreateTenant, TenantResponse, UpdateTenant},
    },
    model::BillStatus,
    service::{
        dashboard::DashboardSummary,
        fields::NumberInput,
        payments::PaymentSummary,
        tenants::ContactLinks,
        vacancy::{PropertyVacancies, VacantUnit},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::auth::password::register,
        handler::auth::password::login,
        handler::auth::password::logout,
        handler::session::me,
        handler::accounts::get_profile,
        handler::accounts::update_profile,
        handler::subscription::list_plans,
        handler::subscription::get_subscription,
        handler::subscription::change_plan,
        handler::properties::create_property,
        handler::properties::list_properties,
        handler::properties::get_property,
        handler::properties::update_property,
        handler::properties::delete_property,
        handler::vacancies::property_vacancies,
        handler::vacancies::account_vacancies,
        handler::vacancies::stream_vacancies,
        handler::tenants::create_tenant,
        handler::tenants::list_tenants,
        handler::tenants::get_tenant,
        handler::tenants::update_tenant,
        handler::tenants::delete_tenant,
        handler::bills::create_bill,
        handler::bills::list_bills,
        handler::bills::get_bill,
        handler::bills::update_bill,
        handler::payments::list_payments,
        handler::dashboard::summary
    ),
    components(schemas(
        ErrorResponse,
        Health,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        MeResponse,
        ProfileResponse,
        UpdateProfile,
        PlanResponse,
        SubscriptionResponse,
        ChangePlan,
        NumberInput,
        CreateProperty,
        UpdateProperty,
        PropertyResponse,
        UnitResponse,
        VacantUnit,
        PropertyVacancies,
        CreateTenant,
        UpdateTenant,
        TenantResponse,
        ContactLinks,
        CreateBill,
        UpdateBill,
        BillResponse,
        BillStatus,
        PaymentResponse,
        PaymentListResponse,
        PaymentSummary,
        DashboardSummary
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Registration, login and sessions"),
        (name = "profile", description = "Account profile"),
        (name = "subscription", description = "Plans and property quota"),
        (name = "properties", description = "Properties and their units"),
        (name = "vacancies", description = "Units selectable for tenant assignment"),
        (name = "tenants", description = "Tenants and unit assignment"),
        (name = "bills", description = "Bills"),
        (name = "payments", description = "Payments"),
        (name = "dashboard", description = "Portfolio summary")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/properties",
            "/api/v1/properties/{uid}/vacancies",
            "/api/v1/subscription",
            "/api/v1/bills",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
