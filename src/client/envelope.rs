// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response envelope detection and unwrapping.
//!
//! A body counts as an envelope only if it is an object with a boolean
//! `success`, a string `message` and a `data` key (of any type). Anything
//! else passes through untouched.

use serde_json::Value;

use crate::models::{Envelope, Meta};

/// A decoded response body, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Enveloped(Envelope<Value>),
    Raw(Value),
}

impl ResponseBody {
    /// Classify a body against the envelope schema. Never fails.
    pub fn classify(body: Value) -> Self {
        let Value::Object(mut map) = body else {
            return ResponseBody::Raw(body);
        };

        let shaped = matches!(map.get("success"), Some(Value::Bool(_)))
            && matches!(map.get("message"), Some(Value::String(_)))
            && map.contains_key("data");
        if !shaped {
            return ResponseBody::Raw(Value::Object(map));
        }

        let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
        let message = match map.remove("message") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let data = map.remove("data").unwrap_or(Value::Null);
        let code = map.remove("code").filter(|c| !c.is_null());
        let meta = match map.remove("meta") {
            Some(Value::Object(meta)) => Some(meta),
            _ => None,
        };

        ResponseBody::Enveloped(Envelope {
            success,
            message,
            data,
            code,
            meta,
        })
    }

    pub fn is_enveloped(&self) -> bool {
        matches!(self, ResponseBody::Enveloped(_))
    }

    /// Split into payload and any envelope metadata.
    pub fn into_parts(self) -> (Value, Option<Meta>) {
        match self {
            ResponseBody::Enveloped(envelope) => (envelope.data, envelope.meta),
            ResponseBody::Raw(value) => (value, None),
        }
    }
}

/// Return the `data` of an enveloped body, or the body itself.
pub fn unwrap_payload(body: Value) -> Value {
    ResponseBody::classify(body).into_parts().0
}
