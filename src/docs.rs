// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::send_otp,
        handlers::auth::verify_otp,
        handlers::auth::forgot_password,
        handlers::auth::redeem_reset_token,

        // --- Profile ---
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::profile::update_push_token,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::delete_customer,

        // --- Invoices ---
        handlers::documents::create_invoice,
        handlers::documents::list_invoices,
        handlers::documents::get_invoice,
        handlers::documents::delete_invoice,

        // --- Quotations ---
        handlers::documents::create_quotation,
        handlers::documents::list_quotations,
        handlers::documents::get_quotation,
        handlers::documents::delete_quotation,

        // --- Messages ---
        handlers::messages::list_messages,
        handlers::messages::mark_message_read,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::SendOtpPayload,
            models::auth::VerifyOtpPayload,
            models::auth::OtpResponse,
            models::auth::ForgotPasswordPayload,
            models::auth::RedeemResetTokenPayload,
            models::auth::RedeemResetTokenResponse,

            // --- Profile ---
            models::profile::Profile,
            models::profile::UpdateProfilePayload,
            models::profile::PushTokenPayload,

            // --- Customers ---
            models::customer::Customer,
            models::customer::CreateCustomerPayload,

            // --- Documents ---
            models::document::Direction,
            models::document::Document,
            models::document::LineItem,
            models::document::DocumentDetail,
            models::document::LineItemPayload,
            models::document::CreateDocumentPayload,

            // --- Messages ---
            models::message::Message,
        )
    ),
    tags(
        (name = "Auth", description = "Códigos de verificação e tokens de redefinição de senha (o login é do Supabase)"),
        (name = "Profile", description = "Perfil e token de push do usuário"),
        (name = "Customers", description = "Agenda de clientes"),
        (name = "Invoices", description = "Faturas enviadas e recebidas"),
        (name = "Quotations", description = "Orçamentos enviados e recebidos"),
        (name = "Messages", description = "Notificações in-app")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
