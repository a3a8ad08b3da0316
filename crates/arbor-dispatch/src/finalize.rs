//! Response finalization.

use crate::context::Context;
use crate::dispatch::{Outcome, ACCESS_CONTROL_ALLOW_METHODS};
use arbor_core::{Method, Response, Status};

/// Turn an outcome into a response.
///
/// The representation's status override and metadata win over the
/// handler's. Bodies are serialized by the codec negotiated from the
/// representation's preferred output types and the request's `Accept`
/// header; `HEAD` and empty representations yield a status-only response.
pub(crate) async fn finalize(ctx: &Context<'_>, outcome: Outcome) -> Response {
    let Outcome {
        status,
        representation,
        mut headers,
        entity,
        parent,
    } = outcome;

    let status = representation.status().unwrap_or(status);
    headers.merge(representation.meta());
    if !representation.allow_redirect() {
        headers.remove("Location");
    }

    if !headers.contains(ACCESS_CONTROL_ALLOW_METHODS) {
        if let Some(entity) = &entity {
            match ctx
                .auth
                .granted_methods(entity, parent.as_ref(), Some(ctx.request))
                .await
            {
                Ok(grants) => headers.insert(ACCESS_CONTROL_ALLOW_METHODS, grants.header_value()),
                Err(e) => tracing::debug!(error = %e, "Grant lookup failed while finalizing"),
            }
        }
    }

    if representation.is_empty() || ctx.request.method() == Method::Head {
        let mut response = Response::new(status);
        response.meta_mut().merge(&headers);
        return response;
    }

    let Some(negotiated) = ctx.registry.negotiate_preferred(
        representation.preferred_output_types(),
        ctx.request.accepted_types(),
    ) else {
        tracing::debug!(accept = ?ctx.request.accepted_types(), "No acceptable output format");
        let mut response = Response::new(Status::NoAcceptableFormat);
        response.meta_mut().merge(&headers);
        return response;
    };

    match negotiated
        .processor
        .serialize(entity.as_ref(), &representation, Some(ctx.request))
        .await
    {
        Ok(mut response) => {
            response.set_status(status);
            response.meta_mut().merge(&headers);
            response
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                media_type = %negotiated.media_type,
                "Failed to serialize representation"
            );
            Response::new(Status::ServerError)
        }
    }
}
