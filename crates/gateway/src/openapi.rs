//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use auth_service_lib::TokenResponse;
use billing_service::service::{Dashboard, OfficeSummary, PaymentCheckout};
use domain::{
    Device, GlobalTotals, Invoice, InvoiceStatus, ListScope, Money, Office, OfficeFinancials,
    OfficePaymentStatus, PaymentIntent, PlanType, PurgedEntity, UsageRecord, UserResponse,
    UserRole,
};

use crate::handlers::auth_handler::{
    ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
use crate::handlers::device_handler::{CreateDeviceRequest, UpdateDeviceRequest};
use crate::handlers::invoice_handler::GenerateInvoiceRequest;
use crate::handlers::office_handler::{CreateOfficeRequest, UpdateOfficeRequest};
use crate::handlers::payment_handler::CreateIntentRequest;
use crate::handlers::usage_handler::{BulkUsageRequest, UsageRequest};
use crate::handlers::user_handler::UpdateUserRequest;
use crate::handlers::MessageResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::forgot_password,
        crate::handlers::auth_handler::reset_password,
        crate::handlers::auth_handler::me,
        crate::handlers::office_handler::list_offices,
        crate::handlers::office_handler::create_office,
        crate::handlers::office_handler::get_office,
        crate::handlers::office_handler::update_office,
        crate::handlers::office_handler::office_summary,
        crate::handlers::office_handler::delete_office,
        crate::handlers::office_handler::purge_office,
        crate::handlers::office_handler::restore_office,
        crate::handlers::device_handler::list_devices,
        crate::handlers::device_handler::create_device,
        crate::handlers::device_handler::get_device,
        crate::handlers::device_handler::update_device,
        crate::handlers::device_handler::delete_device,
        crate::handlers::device_handler::purge_device,
        crate::handlers::device_handler::restore_device,
        crate::handlers::invoice_handler::list_invoices,
        crate::handlers::invoice_handler::generate_invoice,
        crate::handlers::invoice_handler::get_invoice,
        crate::handlers::invoice_handler::mark_paid,
        crate::handlers::invoice_handler::mark_unpaid,
        crate::handlers::invoice_handler::delete_invoice,
        crate::handlers::invoice_handler::purge_invoice,
        crate::handlers::invoice_handler::restore_invoice,
        crate::handlers::usage_handler::list_usage,
        crate::handlers::usage_handler::record_usage,
        crate::handlers::usage_handler::record_bulk,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::purge_user,
        crate::handlers::user_handler::restore_user,
        crate::handlers::dashboard_handler::dashboard,
        crate::handlers::payment_handler::create_intent,
        crate::handlers::payment_handler::refresh_intent,
        crate::handlers::public_handler::public_create_intent,
        crate::handlers::public_handler::public_refresh_intent,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            TokenResponse,
            MessageResponse,
            UserResponse,
            UserRole,
            UpdateUserRequest,
            Office,
            CreateOfficeRequest,
            UpdateOfficeRequest,
            OfficeFinancials,
            OfficePaymentStatus,
            Device,
            PlanType,
            CreateDeviceRequest,
            UpdateDeviceRequest,
            Invoice,
            InvoiceStatus,
            GenerateInvoiceRequest,
            UsageRecord,
            UsageRequest,
            BulkUsageRequest,
            PaymentIntent,
            PaymentCheckout,
            CreateIntentRequest,
            Dashboard,
            OfficeSummary,
            GlobalTotals,
            Money,
            ListScope,
            PurgedEntity,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Accounts, login and password resets"),
        (name = "Offices", description = "Dental offices"),
        (name = "Devices", description = "Lune machines installed at offices"),
        (name = "Invoices", description = "Monthly invoices"),
        (name = "Usage", description = "Treatment session ingestion"),
        (name = "Users", description = "User administration"),
        (name = "Dashboard", description = "Financial overview"),
        (name = "Payments", description = "Payment processor intents"),
        (name = "Public", description = "Payment links that need no account"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
