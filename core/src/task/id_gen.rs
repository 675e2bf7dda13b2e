//! Task id generation.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::types::TaskId;

/// Namespace for name-based task ids.
pub const TASK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3a52_9e0b_4d7a_b2c4_81d5_f09e_7a13);

pub fn random_task_id() -> TaskId {
    Uuid::new_v4()
}

/// Derive a stable id from the instructions and parameters.
///
/// Parameters are visited in key order and every field is length-prefixed, so
/// two inputs collide only when they are equal.
pub fn deterministic_task_id(instructions: &str, parameters: &BTreeMap<String, String>) -> TaskId {
    let mut canonical = String::with_capacity(instructions.len() + 16);
    push_field(&mut canonical, instructions);
    for (key, value) in parameters {
        push_field(&mut canonical, key);
        push_field(&mut canonical, value);
    }
    Uuid::new_v5(&TASK_ID_NAMESPACE, canonical.as_bytes())
}

fn push_field(buf: &mut String, field: &str) {
    buf.push_str(&field.len().to_string());
    buf.push(':');
    buf.push_str(field);
    buf.push(';');
}
