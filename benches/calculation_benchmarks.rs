//! Performance benchmarks for the attendance and payroll engine.
//!
//! This benchmark suite covers the hot paths:
//! - Recomputing one attendance record with several break sessions
//! - Calculating one employee's payroll from a monthly summary
//! - Calculating a whole period over the in-memory store, at several headcounts
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use attendance_payroll_engine::calculation::{
    PayrollInput, calculate_employee_payroll, close_session, open_session, recompute_attendance,
};
use attendance_payroll_engine::config::{BreakConfigDocument, PolicySet};
use attendance_payroll_engine::models::{
    AllowanceAssignment, AttendanceRecord, AttendanceSummary, DayType, DeductionAmount,
    DeductionAssignment, Employee, EmployeeSalaryConfig, HolidayCalendar, OvertimeMinutes,
    ResolvedSchedule, SalaryType, WorkSchedule,
};
use attendance_payroll_engine::service::{
    AttendanceService, EngineContext, InMemoryStore, PayrollService, PolicyDocument,
    PolicyProvider,
};

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Weekdays of January 2026.
fn working_days() -> Vec<NaiveDate> {
    [
        1, 2, 5, 6, 7, 8, 9, 12, 13, 14, 15, 16, 19, 20, 21, 22, 23, 26, 27, 28, 29, 30,
    ]
    .iter()
    .map(|d| NaiveDate::from_ymd_opt(2026, 1, *d).unwrap())
    .collect()
}

/// Builds a store with `headcount` employees who each worked every weekday
/// of January 2026 with an hour of overtime.
fn seeded_services(rt: &tokio::runtime::Runtime, headcount: usize) -> (PayrollService, uuid::Uuid) {
    let store = InMemoryStore::new();
    let ctx = EngineContext::in_memory(store.clone(), HolidayCalendar::default());
    let attendance = AttendanceService::new(ctx.clone());
    let payroll = PayrollService::new(ctx);

    rt.block_on(async {
        store
            .save_policy(
                "acme",
                PolicyDocument::Break(BreakConfigDocument {
                    tracking_enabled: Some(false),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        for i in 0..headcount {
            let id = format!("emp_{i:04}");
            store
                .add_employee(Employee {
                    id: id.clone(),
                    company_id: "acme".to_string(),
                    name: id.clone(),
                    active: true,
                })
                .unwrap();
            store
                .add_salary_version(EmployeeSalaryConfig {
                    employee_id: id.clone(),
                    salary_type: if i % 2 == 0 {
                        SalaryType::Monthly
                    } else {
                        SalaryType::Hourly
                    },
                    rate: if i % 2 == 0 {
                        Decimal::from(300_000)
                    } else {
                        Decimal::from(1_800)
                    },
                    effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    effective_to: None,
                })
                .unwrap();
            store
                .assign_schedule(
                    id.clone(),
                    WorkSchedule::Fixed {
                        start: time(9, 0),
                        end: time(18, 0),
                        break_minutes: 60,
                    },
                )
                .unwrap();

            for day in working_days() {
                attendance
                    .check_in(&id, day.and_time(time(9, 0)), None)
                    .await
                    .unwrap();
                attendance
                    .check_out(&id, day.and_time(time(19, 0)), None)
                    .await
                    .unwrap();
            }
        }

        let period = payroll.create_period("acme", 2026, 1).await.unwrap();
        (payroll, period.id)
    })
}

/// Benchmark: recomputing one record with three break sessions.
fn bench_recompute_attendance(c: &mut Criterion) {
    let policies = PolicySet::default();
    let check_in = dt("2026-01-13 09:00");
    let mut record = AttendanceRecord::checked_in("emp_001", "acme", check_in, check_in, None);
    record.check_out = Some(dt("2026-01-13 23:30"));

    let window = policies.attendance.night_window;
    let sessions: Vec<_> = [("12:00", "13:00"), ("15:00", "15:15"), ("19:00", "19:30")]
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            let mut session = open_session(
                &record,
                i as u32 + 1,
                dt(&format!("2026-01-13 {start}")),
                &window,
            );
            close_session(
                &mut session,
                dt(&format!("2026-01-13 {end}")),
                &policies.breaks,
                &window,
            );
            session
        })
        .collect();
    let schedule = ResolvedSchedule::on_date(record.work_date, time(9, 0), time(18, 0), 60);

    c.bench_function("recompute_attendance", |b| {
        b.iter(|| {
            let mut record = record.clone();
            recompute_attendance(
                &mut record,
                black_box(&sessions),
                &schedule,
                DayType::Regular,
                &policies,
            );
            black_box(record)
        })
    });
}

/// Benchmark: one employee's payroll from a monthly summary.
fn bench_employee_payroll(c: &mut Criterion) {
    let policies = PolicySet::default();
    let salary = EmployeeSalaryConfig {
        employee_id: "emp_001".to_string(),
        salary_type: SalaryType::Monthly,
        rate: Decimal::from(3_000_000),
        effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        effective_to: None,
    };
    let summary = AttendanceSummary {
        working_days: 20,
        shifts_worked: 20,
        working_minutes: 20 * 480 + 900,
        overtime: OvertimeMinutes {
            regular: 600,
            night: 120,
            holiday: 60,
            weekend: 120,
        },
        total_break_minutes: 20 * 60,
        effective_break_minutes: 20 * 60,
        ..AttendanceSummary::default()
    };
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let allowances = vec![AllowanceAssignment {
        employee_id: "emp_001".to_string(),
        code: "commute".to_string(),
        amount: Some(Decimal::from(15_000)),
        taxable: false,
        effective_from: start,
        effective_to: None,
    }];
    let deductions = vec![DeductionAssignment {
        employee_id: "emp_001".to_string(),
        code: "pension".to_string(),
        amount: Some(DeductionAmount::Percentage(Decimal::from(3))),
        taxable: false,
        effective_from: start,
        effective_to: None,
    }];

    c.bench_function("employee_payroll", |b| {
        b.iter(|| {
            let breakdown = calculate_employee_payroll(PayrollInput {
                salary: &salary,
                summary: black_box(&summary),
                allowances: &allowances,
                deductions: &deductions,
                policies: &policies,
            })
            .unwrap();
            black_box(breakdown)
        })
    });
}

/// Benchmark: whole-period calculation at several headcounts.
fn bench_period_calculation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("period_calculation");
    // Each sample recalculates every employee; keep the run time reasonable.
    group.sample_size(10);

    for headcount in [1usize, 10, 50, 100] {
        let (payroll, period_id) = seeded_services(&rt, headcount);
        group.throughput(Throughput::Elements(headcount as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", headcount),
            &headcount,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    let result = payroll.calculate_period(period_id).await.unwrap();
                    black_box(result)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_recompute_attendance,
    bench_employee_payroll,
    bench_period_calculation,
);
criterion_main!(benches);
