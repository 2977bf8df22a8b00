use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpResponse,
};
use log::warn;

/// Allowed `Host` header values. Supports `*` and `*.suffix` patterns.
#[derive(Debug, Clone)]
pub struct TrustedHosts {
    patterns: Vec<String>,
}

impl TrustedHosts {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().map(|p| p.to_ascii_lowercase()).collect(),
        }
    }

    pub fn allows(&self, host: &str) -> bool {
        let host = strip_port(host).to_ascii_lowercase();
        self.patterns.iter().any(|pattern| {
            if pattern == "*" {
                return true;
            }
            match pattern.strip_prefix('*') {
                Some(suffix) => suffix.starts_with('.') && host.ends_with(suffix),
                None => *pattern == host,
            }
        })
    }
}

/// Drops a trailing `:port`, keeping bracketed IPv6 literals whole.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    host.split(':').next().unwrap_or_default()
}

/// Rejects requests addressed to a host outside the configured list.
/// Passes everything through when no [`TrustedHosts`] is registered.
pub async fn trusted_host<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let host = req.connection_info().host().to_owned();
    let allowed = match req.app_data::<web::Data<TrustedHosts>>() {
        Some(hosts) => hosts.allows(&host),
        None => true,
    };

    if !allowed {
        warn!("Rejected request for untrusted host {}", host);
        let response = HttpResponse::BadRequest()
            .content_type("text/plain")
            .body("Invalid host header");
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}
