// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [21.4 Date Objects](https://tc39.es/ecma262/#sec-date-objects)
//!
//! A `Date` wraps a single millisecond-since-epoch `f64` timestamp
//! (21.4.1.1's "time value", `NaN` for invalid). `spec.md` §4.9 scopes
//! this engine to UTC only: no local-time getters/setters, no `Intl`
//! formatting. `now`/`constructor` with no arguments both read the
//! current time through `HostHooks::now_millis` rather than
//! `SystemTime::now()` directly, so embedders can make time
//! deterministic for tests.

use crate::context::Context;
use crate::execution::agent::{JsError, JsResult};
use crate::execution::realm::RealmId;
use crate::types::language::object::{ObjectKind, PropertyAttributes, PropertyDescriptor, PropertyKey};
use crate::types::language::{Object, Value};

struct DateData {
    time_value: f64,
}

pub fn install(agent: &mut Context, realm: RealmId, global_object: Object) {
    let object_prototype = agent.realm(realm).intrinsics.get("%Object.prototype%");
    let prototype = agent.heap.create_object(object_prototype, ObjectKind::Ordinary);
    agent.realm_mut(realm).intrinsics.set("%Date.prototype%", Value::Object(prototype));

    let constructor = crate::builtins::ordinary::create_builtin_function(agent, crate::vm::builtins::ROUTING_DATE_CONSTRUCTOR, "Date", 7);
    let prototype_key = PropertyKey::from_str(agent, "prototype");
    constructor.object().data_mut(agent).define_property(prototype_key, PropertyDescriptor::Data { value: Value::Object(prototype), attributes: PropertyAttributes { writable: false, enumerable: false, configurable: false } });
    crate::builtins::ordinary::define_builtin_method(agent, constructor.object(), "now", crate::vm::builtins::ROUTING_DATE_NOW, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype, "getTime", crate::vm::builtins::ROUTING_DATE_PROTOTYPE_GET_TIME, 0, |_, _, _| unreachable!("routed"));
    crate::builtins::ordinary::define_builtin_method(agent, prototype, "toISOString", crate::vm::builtins::ROUTING_DATE_PROTOTYPE_TO_ISO_STRING, 0, |_, _, _| unreachable!("routed"));

    let key = PropertyKey::from_str(agent, "Date");
    crate::abstract_operations::operations_on_objects::create_non_enumerable_data_property(agent, global_object, key, constructor.into());
}

fn this_date(agent: &mut Context, this: Value) -> JsResult<Object> {
    this.as_object()
        .filter(|o| o.data(agent).kind == ObjectKind::Date)
        .ok_or_else(|| JsError::type_error(agent, "method called on a non-Date receiver"))
}

fn data(agent: &Context, date: Object) -> &DateData {
    date.data(agent).auxiliary.as_ref().and_then(|a| a.downcast_ref::<DateData>()).expect("Date object missing DateData")
}

fn new_date(agent: &mut Context, time_value: f64) -> Object {
    let realm = agent.current_realm_id();
    let prototype = agent.realm(realm).intrinsics.get("%Date.prototype%");
    let date = agent.heap.create_object(prototype, ObjectKind::Date);
    date.data_mut(agent).auxiliary = Some(Box::new(DateData { time_value }));
    date
}

pub fn constructor(agent: &mut Context, args: &[Value]) -> JsResult<Value> {
    let time_value = match args.first().copied() {
        None => agent.host_hooks.now_millis(),
        Some(value) if args.len() == 1 => crate::abstract_operations::type_conversion::to_number(agent, value)?.value(agent),
        Some(_) => {
            let mut parts = [0.0; 7];
            parts[2] = 1.0;
            for (i, slot) in parts.iter_mut().enumerate().take(args.len().min(7)) {
                *slot = crate::abstract_operations::type_conversion::to_number(agent, args[i])?.value(agent);
            }
            time_from_components(parts[0], parts[1], parts[2], parts[3], parts[4], parts[5], parts[6])
        }
    };
    Ok(Value::Object(new_date(agent, time_value)))
}

/// Approximates 21.4.1.13 `MakeDate`/`MakeDay` without a full calendar
/// implementation: years/months roll over via `chrono`-free day-count
/// arithmetic good enough for the common case of literal year/month/day
/// arguments, not every Julian-calendar edge case.
#[allow(clippy::too_many_arguments)]
fn time_from_components(year: f64, month: f64, day: f64, hour: f64, minute: f64, second: f64, millisecond: f64) -> f64 {
    if [year, month, day, hour, minute, second, millisecond].iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let year = if (0.0..=99.0).contains(&year) { 1900.0 + year.trunc() } else { year.trunc() };
    let total_months = year * 12.0 + month.trunc();
    let y = (total_months / 12.0).floor();
    let m = total_months - y * 12.0;
    let days_since_epoch = days_from_civil(y as i64, m as u32 + 1) + (day.trunc() - 1.0);
    let ms_per_day = 86_400_000.0;
    days_since_epoch * ms_per_day + hour.trunc() * 3_600_000.0 + minute.trunc() * 60_000.0 + second.trunc() * 1000.0 + millisecond.trunc()
}

/// Days between 1970-01-01 and the first of (`year`, `month`), using
/// Howard Hinnant's civil-from-days algorithm run in reverse.
fn days_from_civil(year: i64, month: u32) -> f64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as i64;
    let mp = (month as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    (era * 146_097 + doe - 719_468) as f64
}

pub fn now(agent: &mut Context) -> Value {
    crate::types::language::number::JsNumber::from_f64(agent, agent.host_hooks.now_millis()).into()
}

pub fn prototype_get_time(agent: &mut Context, this: Value) -> JsResult<Value> {
    let date = this_date(agent, this)?;
    Ok(crate::types::language::number::JsNumber::from_f64(agent, data(agent, date).time_value).into())
}

pub fn prototype_to_iso_string(agent: &mut Context, this: Value) -> JsResult<Value> {
    let date = this_date(agent, this)?;
    let time_value = data(agent, date).time_value;
    if time_value.is_nan() {
        return Err(JsError::range_error(agent, "Invalid time value"));
    }
    let text = iso_string(time_value);
    Ok(agent.heap.find_or_create_string(wtf8::Wtf8Buf::from_string(text)).into())
}

fn iso_string(time_value: f64) -> String {
    let ms_per_day = 86_400_000.0;
    let days = (time_value / ms_per_day).floor();
    let mut time_of_day = time_value - days * ms_per_day;
    let hour = (time_of_day / 3_600_000.0).floor();
    time_of_day -= hour * 3_600_000.0;
    let minute = (time_of_day / 60_000.0).floor();
    time_of_day -= minute * 60_000.0;
    let second = (time_of_day / 1000.0).floor();
    let millisecond = time_of_day - second * 1000.0;
    let (year, month, day) = civil_from_days(days as i64);
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}.{millisecond:03}Z")
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}
