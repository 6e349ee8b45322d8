//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (e.g. I/O, database operations,
//! calls to Stripe) must be expressed as futures so that the worker can handle other requests in the meantime.
use actix_web::{get, web, HttpResponse, Responder};
use checkout_engine::{
    checkout_objects::CheckoutRequest,
    traits::{CheckoutDatabase, PaymentProvider},
    OrderIntakeApi,
    ReconcileOutcome,
    ReconciliationApi,
};
use log::*;
use stripe_tools::StripeEvent;

use crate::{
    data_objects::{CheckoutResponse, WebhookAck},
    errors::ServerError,
    integrations::stripe::completed_checkout,
    signed_payload::SignedPayload,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
//
// Requests with the wrong method are answered by `method_not_allowed`. A `preflight` handler, if given, answers
// `OPTIONS` on the same path.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal $(preflight $preflight:ident)? impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .route(actix_web::web::route().guard(actix_web::guard::$method()).to($name::< $( [< T $bounds:camel >], )+>))
                    $(.route(actix_web::web::route().guard(actix_web::guard::Options()).to($preflight)))?
                    .default_service(actix_web::web::to($crate::routes::method_not_allowed));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

pub async fn method_not_allowed() -> Result<HttpResponse, ServerError> {
    Err(ServerError::MethodNotAllowed)
}

/// CORS preflight. The CORS headers themselves are added to every response by [`crate::helpers::cors_headers`].
pub async fn cors_preflight() -> impl Responder {
    HttpResponse::Ok().finish()
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//--------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout_session => Post "/checkout-session" preflight cors_preflight impl CheckoutDatabase, PaymentProvider);
/// Opens a Stripe Checkout session for the submitted cart.
///
/// The cart is re-priced on the server; the client's idea of the total is never used. Returns the hosted checkout URL
/// that the storefront should redirect to.
pub async fn checkout_session<B, P>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderIntakeApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    P: PaymentProvider,
{
    let request = body.into_inner();
    trace!("💻️ Received checkout request with {} items from {}", request.cart_items.len(), request.origin);
    let result = api.open_checkout(request).await.map_err(|e| {
        debug!("💻️ Checkout request failed. {e}");
        ServerError::from(e)
    })?;
    info!("💻️ Checkout session {} opened for order #{}", result.session_id, result.order.id);
    Ok(HttpResponse::Ok().json(CheckoutResponse { url: result.url }))
}

//--------------------------------------------   Webhook  -----------------------------------------------------
route!(payment_webhook => Post "/payment-webhook" impl CheckoutDatabase);
/// Stripe webhook receiver.
///
/// The signature is checked by the [`SignedPayload`] extractor before this handler runs. Only
/// `checkout.session.completed` events change state; every other event type is acknowledged and ignored. Redelivered
/// events are acknowledged without side effects.
pub async fn payment_webhook<B: CheckoutDatabase>(
    payload: SignedPayload,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let event = serde_json::from_slice::<StripeEvent>(payload.as_bytes()).map_err(|e| {
        warn!("💻️ Could not parse webhook event. {e}");
        ServerError::MalformedEvent(e.to_string())
    })?;
    trace!("💻️ Received webhook event {} ({})", event.id, event.event_type);
    if !event.is_checkout_completed() {
        debug!("💻️ Ignoring {} event {}", event.event_type, event.id);
        return Ok(HttpResponse::Ok().json(WebhookAck::received()));
    }
    let session = event.checkout_session().map_err(|e| {
        warn!("💻️ Event {} does not contain a checkout session. {e}", event.id);
        ServerError::MalformedEvent(e.to_string())
    })?;
    let checkout = completed_checkout(&session)?;
    match api.reconcile(checkout).await? {
        ReconcileOutcome::Finalized(order) => {
            info!("💻️ Event {} finalized order #{} (session {})", event.id, order.id, session.id)
        },
        ReconcileOutcome::AlreadyReconciled => {
            info!("💻️ Event {} is a redelivery. Session {} was already reconciled.", event.id, session.id)
        },
    }
    Ok(HttpResponse::Ok().json(WebhookAck::received()))
}
