//! Rate-limit admission for contact endpoints.

use rolodex_limiter::Quota;

use crate::app::{errors, services::AppServices};
use crate::context::ClientIp;

/// Operation classes limited independently per client.
#[derive(Debug, Copy, Clone)]
pub enum RateClass {
    ContactCreate,
    ContactRead,
    ContactUpdate,
    ContactDelete,
    ContactSearch,
    ContactBirthdays,
}

impl RateClass {
    fn as_str(self) -> &'static str {
        match self {
            RateClass::ContactCreate => "contact_create",
            RateClass::ContactRead => "contact_read",
            RateClass::ContactUpdate => "contact_update",
            RateClass::ContactDelete => "contact_delete",
            RateClass::ContactSearch => "contact_search",
            RateClass::ContactBirthdays => "contact_birthdays",
        }
    }

    fn quota(self, services: &AppServices) -> Quota {
        match self {
            RateClass::ContactCreate | RateClass::ContactUpdate | RateClass::ContactDelete => {
                services.write_quota
            }
            RateClass::ContactRead | RateClass::ContactSearch | RateClass::ContactBirthdays => {
                services.read_quota
            }
        }
    }
}

/// Admit or reject the request for this class and client.
pub fn check(
    services: &AppServices,
    class: RateClass,
    ip: &ClientIp,
) -> Result<(), axum::response::Response> {
    let key = format!("{}:{}", class.as_str(), ip.as_str());
    let decision = services.limiter.allow(&key, class.quota(services));
    if decision.allowed {
        Ok(())
    } else {
        tracing::debug!(key, "rate limited");
        Err(errors::rate_limited(&decision))
    }
}
