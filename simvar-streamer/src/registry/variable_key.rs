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

//! Immutable provider-variable identity used for registration dedupe.

use crate::provider::DataType;

/// Identifies one provider variable independent of who subscribes to it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VariableKey {
    name: String,
    unit: String,
    data_type: DataType,
}

impl VariableKey {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

#[cfg(test)]
mod tests {
    use super::VariableKey;
    use crate::provider::DataType;
    use std::collections::HashSet;

    #[test]
    fn keys_with_same_triple_dedupe() {
        let mut seen = HashSet::new();
        seen.insert(VariableKey::new("AIRSPEED TRUE", "knot", DataType::Float64));
        seen.insert(VariableKey::new(
            "AIRSPEED TRUE".to_string(),
            "knot".to_string(),
            DataType::Float64,
        ));

        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn unit_and_type_are_part_of_identity() {
        let knots = VariableKey::new("AIRSPEED TRUE", "knot", DataType::Float64);
        let mph = VariableKey::new("AIRSPEED TRUE", "mph", DataType::Float64);
        let float32 = VariableKey::new("AIRSPEED TRUE", "knot", DataType::Float32);

        assert_ne!(knots, mph);
        assert_ne!(knots, float32);
    }
}
