//! Reference instances.

use prodalloc_core::Record;

use crate::fixtures::row;

/// One product with plan 100, two steps, each step runnable on two machines
/// of capacity 200 and unit resource 1.
pub fn two_steps_two_machines() -> Vec<Record> {
    let mut records = Vec::new();
    for step in 1..=2 {
        for machine in ["M1", "M2"] {
            records.push(
                row("P1", step, machine)
                    .plan(100)
                    .capacity(200)
                    .unit_value(1_i64)
                    .unit_cost(if machine == "M1" { 2_i64 } else { 3_i64 })
                    .build(),
            );
        }
    }
    records
}

/// [`two_steps_two_machines`] with step 1 on M1 fixed at 50.
pub fn fixed_step() -> Vec<Record> {
    let mut records = two_steps_two_machines();
    records[0] = row("P1", 1, "M1")
        .plan(100)
        .capacity(200)
        .unit_value(1_i64)
        .unit_cost(2_i64)
        .fixed(50_i64)
        .build();
    records
}

/// Two products sharing one machine of upper bound 200, each planned at 150.
pub fn shared_machine() -> Vec<Record> {
    vec![
        row("P1", 1, "M1")
            .plan(150)
            .capacity(200)
            .unit_value(1_i64)
            .build(),
        row("P2", 1, "M1")
            .plan(150)
            .capacity(200)
            .unit_value(1_i64)
            .build(),
    ]
}

/// A larger instance: every product step runs on every machine.
///
/// Unit values and costs vary deterministically with the indices.
pub fn grid(products: usize, steps: usize, machines: usize) -> Vec<Record> {
    let mut records = Vec::with_capacity(products * steps * machines);
    for p in 0..products {
        for s in 0..steps {
            for m in 0..machines {
                records.push(
                    row(&format!("P{p}"), s as i64 + 1, &format!("M{m}"))
                        .plan(100 + 25 * p as i64)
                        .capacity(10_000)
                        .unit_value(1 + ((p + s + m) % 3) as i64)
                        .unit_cost(1 + ((p * 7 + s * 3 + m * 5) % 11) as i64)
                        .build(),
                );
            }
        }
    }
    records
}

/// A tiny instance small enough for [`brute_force`](crate::brute_force).
///
/// Intended with global allocation bounds of `[0, 4]`.
pub fn tiny() -> Vec<Record> {
    vec![
        row("P1", 1, "M1")
            .plan(4)
            .capacity(9)
            .unit_value(2_i64)
            .unit_cost(3_i64)
            .build(),
        row("P1", 1, "M2")
            .plan(4)
            .capacity(5)
            .unit_value(1_i64)
            .unit_cost(5_i64)
            .build(),
        row("P2", 1, "M1")
            .plan(3)
            .capacity(9)
            .unit_value(1_i64)
            .unit_cost(2_i64)
            .build(),
        row("P2", 1, "M2")
            .plan(3)
            .capacity(5)
            .unit_value(2_i64)
            .unit_cost(1_i64)
            .build(),
    ]
}

/// Three products with two steps each on two shared machines.
///
/// Intended with global allocation bounds of `[0, 2]`, which keeps it within
/// reach of [`brute_force`](crate::brute_force).
pub fn tiny_two_steps() -> Vec<Record> {
    let plans = [("P1", 2_i64), ("P2", 3), ("P3", 1)];
    let mut records = Vec::with_capacity(12);
    for (p, (product, plan)) in plans.into_iter().enumerate() {
        for step in 1..=2 {
            for (m, (machine, capacity)) in [("M1", 8_i64), ("M2", 6)].into_iter().enumerate() {
                let unit_value: i64 = if m == 1 && step == 2 { 2 } else { 1 };
                records.push(
                    row(product, step, machine)
                        .plan(plan)
                        .capacity(capacity)
                        .unit_value(unit_value)
                        .unit_cost(1 + ((p * 3 + step as usize * 2 + m * 5) % 7) as i64)
                        .build(),
                );
            }
        }
    }
    records
}
