/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Shared field values and value-format helpers.

use crate::registry::VariableKey;

pub const NONE: &str = "none";
pub const REASON_PROVIDER_REJECTED: &str = "provider_rejected";
pub const REASON_INVALID_ENTRY: &str = "invalid_entry";
pub const REASON_ALIAS_REPLACED: &str = "alias_replaced";
pub const REASON_SHUTDOWN: &str = "shutdown";

/// Formats a variable key as `name [unit, type]`.
pub fn format_key(key: &VariableKey) -> String {
    format!("{} [{}, {}]", key.name(), key.unit(), key.data_type())
}
