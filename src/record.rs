//! The eleven object-record primitives: parameterized builders that each
//! produce the canonical `key,value,...;` string for one editor object
//! kind. Every instruction emitter composes these rather than building
//! record strings by hand.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A record field's value, rendered the way the host engine's own save
/// format renders it: floats drop a trailing `.0`, integers never carry a
/// fractional separator.
#[derive(Clone, Copy, Debug)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => {
                write!(f, "{}", x as i64)
            }
            FieldValue::Float(x) => write!(f, "{}", x),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> FieldValue { FieldValue::Int(v as i64) }
        })*
    };
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, bool);
impl From<f64> for FieldValue {
    fn from(v: f64) -> FieldValue {
        FieldValue::Float(v)
    }
}
impl From<f32> for FieldValue {
    fn from(v: f32) -> FieldValue {
        FieldValue::Float(v as f64)
    }
}

/// Incrementally assembled `key,value` record, terminated with `;` by
/// [`RecordBuilder::finish`].
struct RecordBuilder(String);

impl RecordBuilder {
    fn new(object_id: u32, x: f64, y: f64) -> Self {
        let mut s = String::with_capacity(128);
        s.push_str(&format!(
            "1,{},2,{},3,{},64,1,67,1",
            object_id,
            FieldValue::from(x),
            FieldValue::from(y)
        ));
        RecordBuilder(s)
    }

    fn groups(mut self, groups: &[i32]) -> Self {
        if !groups.is_empty() {
            let joined = groups
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(".");
            self.0.push_str(",57,");
            self.0.push_str(&joined);
        }
        self
    }

    fn detail(mut self, detail: u32) -> Self {
        self.0.push_str(&format!(",155,{}", detail));
        self
    }

    fn angle(mut self, angle: f64) -> Self {
        if angle != 0.0 {
            self.0.push_str(&format!(",6,{}", FieldValue::from(angle)));
        }
        self
    }

    fn scale(mut self, xscale: f64, yscale: f64) -> Self {
        if xscale != 1.0 {
            self.0
                .push_str(&format!(",128,{}", FieldValue::from(xscale)));
        }
        if yscale != 1.0 {
            self.0
                .push_str(&format!(",129,{}", FieldValue::from(yscale)));
        }
        self
    }

    fn trigger_flags(mut self, spawn_triggered: bool, touch_triggered: bool, multi_triggerable: bool) -> Self {
        if spawn_triggered {
            self.0.push_str(",62,1");
        }
        if touch_triggered {
            self.0.push_str(",11,1");
        }
        if multi_triggerable {
            self.0.push_str(",87,1");
        }
        self
    }

    fn active_trigger(mut self) -> Self {
        self.0.push_str(",36,1");
        self
    }

    fn kv(mut self, key: u32, value: impl Into<FieldValue>) -> Self {
        self.0.push_str(&format!(",{},{}", key, value.into()));
        self
    }

    fn kv_if(self, cond: bool, key: u32, value: impl Into<FieldValue>) -> Self {
        if cond {
            self.kv(key, value)
        } else {
            self
        }
    }

    fn raw(mut self, s: &str) -> Self {
        self.0.push_str(s);
        self
    }

    fn finish(mut self) -> String {
        self.0.push(';');
        self.0
    }
}

/// `1615` counter display object.
#[allow(clippy::too_many_arguments)]
pub fn counter_object_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    id: u32,
    timer: bool,
    align: i32,
    seconds_only: bool,
    special_mode: i32,
) -> String {
    RecordBuilder::new(1615, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .kv_if(id > 0, 80, id)
        .kv_if(seconds_only, 389, 1)
        .kv_if(special_mode < 0, 390, special_mode)
        .kv_if(align > 0, 391, align)
        .kv_if(timer, 466, 1)
        .finish()
}

/// `1268` spawn trigger.
#[allow(clippy::too_many_arguments)]
pub fn spawn_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    spawn_id: i32,
    delay: f64,
    delay_var: f64,
    reset_remap: bool,
    spawn_ordered: bool,
    preview_disable: bool,
    spawn_delay_enabled: bool,
    spawn_ordered_enabled: bool,
) -> String {
    RecordBuilder::new(1268, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .active_trigger()
        .kv_if(spawn_id != 0, 51, spawn_id)
        .kv_if(delay != 0.0 && spawn_delay_enabled, 63, delay)
        .kv_if(delay_var != 0.0, 556, delay_var)
        .kv_if(preview_disable, 102, 1)
        .kv_if(spawn_ordered && spawn_ordered_enabled, 441, 1)
        .kv_if(reset_remap, 581, 1)
        .finish()
}

/// `3641` persistent-item trigger.
#[allow(clippy::too_many_arguments)]
pub fn persistent_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    item_id: u32,
    timer: bool,
    persistent: bool,
    target_all: bool,
    reset: bool,
) -> String {
    RecordBuilder::new(3641, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .active_trigger()
        .kv_if(item_id > 0, 80, item_id)
        .kv_if(persistent, 491, 1)
        .kv_if(target_all, 492, 1)
        .kv_if(reset, 493, 1)
        .kv_if(timer, 494, 1)
        .finish()
}

/// `3620` item-compare trigger.
#[allow(clippy::too_many_arguments)]
pub fn compare_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    true_id: i32,
    false_id: i32,
    left_item_id: u32,
    right_item_id: u32,
    left_item_type: u8,
    right_item_type: u8,
    left_mod: f64,
    right_mod: f64,
    left_operator: i32,
    right_operator: i32,
    compare_operator: i32,
    tolerance: f64,
    left_round_mode: i32,
    right_round_mode: i32,
    left_sign_mode: i32,
    right_sign_mode: i32,
) -> String {
    RecordBuilder::new(3620, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .active_trigger()
        .kv_if(left_item_id != 0, 80, left_item_id)
        .kv_if(right_item_id != 0, 95, right_item_id)
        .kv_if(true_id != 0, 51, true_id)
        .kv_if(false_id != 0, 71, false_id)
        .kv(476, left_item_type)
        .kv(477, right_item_type)
        .kv_if(left_mod != 0.0, 479, left_mod)
        .kv_if(right_mod != 0.0, 483, right_mod)
        .kv(480, left_operator)
        .kv(481, right_operator)
        .kv_if(compare_operator != 0, 482, compare_operator)
        .kv_if(tolerance != 0.0, 484, tolerance)
        .kv_if(left_round_mode != 0, 485, left_round_mode)
        .kv_if(right_round_mode != 0, 486, right_round_mode)
        .kv_if(left_sign_mode != 0, 578, left_sign_mode)
        .kv_if(right_sign_mode != 0, 579, right_sign_mode)
        .finish()
}

/// `3619` item-edit trigger.
#[allow(clippy::too_many_arguments)]
pub fn item_edit_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    item1_id: u32,
    item2_id: u32,
    item1_type: u8,
    item2_type: u8,
    result_id: u32,
    result_type: u8,
    modifier: f64,
    assign_operator: i32,
    mod_operator: i32,
    id_operator: i32,
    id_round_mode: i32,
    all_round_mode: i32,
    id_sign_mode: i32,
    all_sign_mode: i32,
) -> String {
    RecordBuilder::new(3619, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .active_trigger()
        .kv_if(item1_id != 0, 80, item1_id)
        .kv_if(item2_id != 0, 95, item2_id)
        .kv_if(item1_type != 0, 476, item1_type)
        .kv_if(item2_type != 0, 477, item2_type)
        .kv(478, result_type)
        .kv_if(result_id != 0, 51, result_id)
        .kv(479, modifier)
        .kv_if(assign_operator != 0, 480, assign_operator)
        .kv(481, id_operator)
        .kv(482, mod_operator)
        .kv_if(id_round_mode != 0, 485, id_round_mode)
        .kv_if(all_round_mode != 0, 486, all_round_mode)
        .kv_if(id_sign_mode != 0, 578, id_sign_mode)
        .kv_if(all_sign_mode != 0, 579, all_sign_mode)
        .finish()
}

/// `914` text object. `text` is encoded as base64 UTF-8, matching the
/// host's kerning-text storage.
pub fn text_object_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    text: &str,
    kerning: i32,
) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    RecordBuilder::new(914, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .raw(&format!(",24,9,31,{}", encoded))
        .kv_if(kerning != 0, 488, kerning)
        .finish()
}

/// `1816` collision block.
pub fn collision_block_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    block_id: u32,
    dynamic_block: bool,
) -> String {
    RecordBuilder::new(1816, x, y)
        .groups(groups)
        .detail(2)
        .angle(angle)
        .scale(xscale, yscale)
        .active_trigger()
        .kv_if(block_id > 0, 80, block_id)
        .kv_if(dynamic_block, 94, 1)
        .finish()
}

/// `1815` collision trigger.
#[allow(clippy::too_many_arguments)]
pub fn collision_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    block_a_id: u32,
    block_b_id: u32,
    target_id: i32,
    activate_group: bool,
) -> String {
    RecordBuilder::new(1815, x, y)
        .groups(groups)
        .detail(2)
        .angle(angle)
        .scale(xscale, yscale)
        .raw(",87,1,36,1")
        .kv_if(target_id != 0, 51, target_id)
        .raw(",10,0.5")
        .kv_if(activate_group, 56, 1)
        .kv_if(block_a_id != 0, 80, block_a_id)
        .kv_if(block_b_id != 0, 95, block_b_id)
        .finish()
}

/// `1049` toggle trigger.
#[allow(clippy::too_many_arguments)]
pub fn toggle_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    target_id: i32,
    activate_group: bool,
) -> String {
    RecordBuilder::new(1049, x, y)
        .groups(groups)
        .detail(2)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .raw(",87,1,36,1")
        .kv_if(target_id != 0, 51, target_id)
        .kv_if(activate_group, 56, 1)
        .finish()
}

/// `901` move trigger. `target_mode` (aim-at-another-object mode) and
/// plain `dx/dy` mode share the primitive but populate disjoint keys.
#[allow(clippy::too_many_arguments)]
pub fn move_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    dx: f64,
    dy: f64,
    time: f64,
    target: i32,
) -> String {
    move_trigger_str_full(
        x, y, xscale, yscale, angle, groups, spawn_triggered, touch_triggered,
        multi_triggerable, dx, dy, time, target, false, 0,
    )
}

/// Full `901` move trigger with explicit target-mode/aim control, used by
/// `MRESET`'s targeted move to `reset_block`.
#[allow(clippy::too_many_arguments)]
pub fn move_trigger_str_full(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    dx: f64,
    dy: f64,
    time: f64,
    target: i32,
    target_mode: bool,
    aim: i32,
) -> String {
    let mut rb = RecordBuilder::new(901, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable);

    if target_mode {
        rb = rb
            .kv(28, 0)
            .kv(29, 0)
            .kv_if(time != 0.0, 10, time)
            .raw(",30,0,85,2")
            .kv(71, aim)
            .kv(100, 1)
            .kv_if(target != 0, 51, target);
    } else {
        rb = rb
            .kv(28, dx)
            .kv(29, dy)
            .kv_if(time != 0.0, 10, time)
            .kv_if(target != 0, 51, target);
    }
    rb.finish()
}

/// A default block with no trigger semantics (`IOBLOCK`'s visual marker,
/// the memory machine's reset anchor). Unlike every other primitive here,
/// kind-1 blocks carry no `64,1,67,1` no-fade/no-enter pair in the
/// reference implementation, so this builds the record by hand instead
/// of going through [`RecordBuilder::new`].
pub fn plain_block_str(x: f64, y: f64, xscale: f64, yscale: f64, groups: &[i32]) -> String {
    let mut s = format!("1,1,2,{},3,{}", FieldValue::from(x), FieldValue::from(y));
    if xscale != 1.0 {
        s.push_str(&format!(",128,{}", FieldValue::from(xscale)));
    }
    if yscale != 1.0 {
        s.push_str(&format!(",129,{}", FieldValue::from(yscale)));
    }
    if !groups.is_empty() {
        let joined = groups.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(".");
        s.push_str(&format!(",57,{}", joined));
    }
    s.push(';');
    s
}

/// `1616` stop trigger. Not used by any instruction emitter in the
/// current instruction set but kept as a primitive since the object-id
/// table (spec §6) documents it as part of the wire format this crate
/// targets.
#[allow(clippy::too_many_arguments)]
pub fn stop_trigger_str(
    x: f64,
    y: f64,
    xscale: f64,
    yscale: f64,
    angle: f64,
    groups: &[i32],
    spawn_triggered: bool,
    touch_triggered: bool,
    multi_triggerable: bool,
    spawn_id: i32,
    stop_mode: i32,
    control_id: bool,
) -> String {
    RecordBuilder::new(1616, x, y)
        .groups(groups)
        .detail(1)
        .angle(angle)
        .scale(xscale, yscale)
        .trigger_flags(spawn_triggered, touch_triggered, multi_triggerable)
        .active_trigger()
        .kv_if(spawn_id != 0, 51, spawn_id)
        .kv_if(control_id, 535, 1)
        .kv_if(stop_mode != 0, 580, stop_mode)
        .finish()
}

/// `1935` time-warp trigger used by the final-output epilogue when both
/// `squish` and `timewarp_trigger` are enabled.
pub fn time_warp_trigger_str() -> String {
    "1,1935,2,-75,3,15,155,1,13,1,36,1,120,5,64,1,67,1;".to_string()
}
