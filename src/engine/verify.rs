//! Verification-step transition handlers.
//!
//! Failure messaging distinguishes only "code invalid" from "ID mismatch";
//! it never reveals which part of a pair was wrong beyond that.

use tracing::warn;

use crate::auth::is_national_id;
use crate::domain::{OrderKind, PriceQuote, UserId};

use super::format;
use super::intent::Intent;
use super::reply::{Keyboard, Reply, Response};
use super::state::SessionState;
use super::Engine;

impl Engine {
    pub(super) fn handle_subscribe_code(
        &self,
        user: UserId,
        service: OrderKind,
        intent: Intent,
    ) -> Response {
        let Intent::Raw(code) = intent else {
            return Response::single(format::subscribe_code_prompt(service), Keyboard::CancelOnly);
        };

        if !self.auth.code_is_active(&code) {
            warn!(user_id = user, "rejected subscribe code");
            return Response::single(format::code_invalid(), Keyboard::CancelOnly);
        }

        self.sessions
            .set(user, SessionState::AwaitingNationalId { service, code });
        Response::single(format::national_id_prompt(), Keyboard::CancelOnly)
    }

    pub(super) fn handle_national_id(
        &self,
        user: UserId,
        service: OrderKind,
        code: String,
        intent: Intent,
        quote: Option<PriceQuote>,
    ) -> Response {
        let Intent::Raw(id) = intent else {
            return Response::single(format::national_id_prompt(), Keyboard::CancelOnly);
        };

        if !is_national_id(&id) {
            return Response::single(format::national_id_format_error(), Keyboard::CancelOnly);
        }

        if !self.auth.submit_national_id(user, &code, &id) {
            warn!(user_id = user, "national id mismatch");
            return Response::single(format::national_id_mismatch(), Keyboard::CancelOnly);
        }

        self.sessions.remove(user);
        let mut response = self.begin_order(user, service, quote);
        response
            .replies
            .insert(0, Reply::new(format::verified_notice(), Keyboard::None));
        response
    }
}
