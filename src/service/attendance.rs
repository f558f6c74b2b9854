//! Attendance operations: check-in/out, breaks, adjustments, absences.
//!
//! Every operation that touches a record or one of its break sessions ends
//! with a full recomputation of the record against the complete, current set
//! of sessions before it is stored.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{
    close_session, get_day_type, open_session, recompute_attendance, round_time,
    synthesize_fixed_breaks, validate_break_end, validate_break_start,
};
use crate::config::{AttendanceConfig, GeoFence, PolicySet};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdjustmentAudit, AttendanceRecord, BreakRecord, DeviceMeta, Employee, ResolvedSchedule,
};

use super::context::EngineContext;
use super::locks::KeyedLocks;
use super::policy::PolicySnapshot;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A manual correction of check-in and/or check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceAdjustment {
    /// New check-in, before rounding.
    #[serde(default)]
    pub check_in: Option<NaiveDateTime>,
    /// New check-out, before rounding.
    #[serde(default)]
    pub check_out: Option<NaiveDateTime>,
    /// Why the record was changed.
    pub reason: String,
    /// Who changed it.
    pub adjusted_by: String,
}

/// A manual correction of one break session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakAdjustment {
    /// New start, before rounding.
    pub start: NaiveDateTime,
    /// New end, before rounding.
    pub end: NaiveDateTime,
    /// Why the session was changed.
    pub reason: String,
    /// Who changed it.
    pub adjusted_by: String,
}

/// Attendance operations against an [`EngineContext`].
///
/// Operations on an existing record hold that record's lock from the first
/// read to the final write, so break sequencing and overlap checks always see
/// the sessions they are about to extend.
#[derive(Debug, Clone)]
pub struct AttendanceService {
    ctx: EngineContext,
    locks: KeyedLocks,
}

impl AttendanceService {
    /// Creates the service with its own lock table.
    pub fn new(ctx: EngineContext) -> Self {
        Self::with_locks(ctx, KeyedLocks::new())
    }

    /// Creates the service sharing `locks` with other instances.
    pub fn with_locks(ctx: EngineContext, locks: KeyedLocks) -> Self {
        Self { ctx, locks }
    }

    /// Records a check-in at `at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown employee
    /// - `Validation` for an inactive employee or a device outside policy
    /// - `Conflict` if the employee already has a record for the date
    pub async fn check_in(
        &self,
        employee_id: &str,
        at: NaiveDateTime,
        device: Option<DeviceMeta>,
    ) -> EngineResult<AttendanceRecord> {
        let employee = self.active_employee(employee_id).await?;
        let snapshot = self.snapshot(&employee.company_id).await?;
        let policies = &snapshot.policies;
        validate_device(device.as_ref(), &policies.attendance)?;

        if self
            .ctx
            .attendance
            .find_record(employee_id, at.date())
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "{employee_id} already checked in on {}",
                at.date()
            )));
        }

        let rounded = round_time(at, policies.attendance.check_in_rounding.as_ref());
        let mut record =
            AttendanceRecord::checked_in(employee_id, &employee.company_id, at, rounded, device);
        self.recompute(&mut record, &[], policies).await?;
        self.ctx.attendance.insert_record(record.clone()).await?;

        tracing::info!(
            employee_id,
            record_id = %record.id,
            check_in = %rounded,
            late_minutes = record.late_minutes,
            "checked in"
        );
        Ok(record)
    }

    /// Records a check-out at `at` against the employee's open record.
    ///
    /// The open record is today's, or yesterday's when a night shift is still
    /// running. Break sessions still open are ended at the check-out time. In
    /// fixed break mode a record without sessions gets its synthesized ones.
    ///
    /// # Errors
    ///
    /// - `NotFound` when there is no record to check out of
    /// - `Validation` for an absence record, a device outside policy, or a
    ///   check-out before check-in
    /// - `Conflict` if the record is already checked out
    pub async fn check_out(
        &self,
        employee_id: &str,
        at: NaiveDateTime,
        device: Option<DeviceMeta>,
    ) -> EngineResult<AttendanceRecord> {
        let employee = self.employee(employee_id).await?;
        let snapshot = self.snapshot(&employee.company_id).await?;
        let policies = &snapshot.policies;
        validate_device(device.as_ref(), &policies.attendance)?;

        let current = self
            .current_record(employee_id, at.date())
            .await?
            .ok_or_else(|| {
                EngineError::not_found("attendance record", format!("{employee_id} on {}", at.date()))
            })?;
        let _guard = self.locks.acquire(current.id).await;
        let mut record = self.record(current.id).await?;
        let Some(check_in) = record.check_in else {
            return Err(EngineError::validation(format!(
                "no check-in recorded for {employee_id} on {}",
                record.work_date
            )));
        };
        if record.is_checked_out() {
            return Err(EngineError::conflict(format!(
                "{employee_id} already checked out on {}",
                record.work_date
            )));
        }

        let rounded = round_time(at, policies.attendance.check_out_rounding.as_ref());
        if rounded < check_in {
            return Err(EngineError::validation(format!(
                "check-out {rounded} precedes check-in {check_in}"
            )));
        }
        record.original_check_out = Some(at);
        record.check_out = Some(rounded);
        record.check_out_device = device;

        let mut sessions = self.ctx.attendance.list_breaks(record.id).await?;
        for session in sessions.iter_mut().filter(|s| !s.is_completed()) {
            let end = rounded.max(session.start_time);
            close_session(
                session,
                end,
                &policies.breaks,
                &policies.attendance.night_window,
            );
            self.ctx.attendance.save_break(session.clone()).await?;
            tracing::debug!(break_id = %session.id, "open break closed at check-out");
        }
        if policies.breaks.fixed_break_mode && sessions.is_empty() {
            sessions = self.store_fixed_breaks(&record, policies).await?;
        }

        self.recompute(&mut record, &sessions, policies).await?;
        self.ctx.attendance.update_record(record.clone()).await?;

        tracing::info!(
            employee_id,
            record_id = %record.id,
            working_minutes = record.working_minutes,
            overtime_minutes = record.overtime_minutes,
            "checked out"
        );
        Ok(record)
    }

    /// Replaces check-in and/or check-out on a record and recomputes it.
    ///
    /// New times go through the configured rounding like live punches, and
    /// the change is appended to the record's adjustment history.
    pub async fn adjust_attendance(
        &self,
        record_id: Uuid,
        adjustment: AttendanceAdjustment,
    ) -> EngineResult<AttendanceRecord> {
        require_reason(&adjustment.reason)?;
        if adjustment.check_in.is_none() && adjustment.check_out.is_none() {
            return Err(EngineError::validation(
                "adjustment must change check-in or check-out",
            ));
        }

        let _guard = self.locks.acquire(record_id).await;
        let mut record = self.record(record_id).await?;
        let snapshot = self.snapshot(&record.company_id).await?;
        let policies = &snapshot.policies;
        let attendance = &policies.attendance;

        if let Some(check_in) = adjustment.check_in {
            record.original_check_in = Some(check_in);
            record.check_in = Some(round_time(check_in, attendance.check_in_rounding.as_ref()));
        }
        if let Some(check_out) = adjustment.check_out {
            record.original_check_out = Some(check_out);
            record.check_out = Some(round_time(check_out, attendance.check_out_rounding.as_ref()));
        }
        match (record.check_in, record.check_out) {
            (None, Some(_)) => {
                return Err(EngineError::validation(
                    "cannot set check-out without a check-in",
                ));
            }
            (Some(check_in), Some(check_out)) if check_out < check_in => {
                return Err(EngineError::validation(format!(
                    "check-out {check_out} precedes check-in {check_in}"
                )));
            }
            _ => {}
        }

        let mut sessions = self.ctx.attendance.list_breaks(record.id).await?;
        if let Some(session) = sessions
            .iter()
            .find(|s| !break_within(s, record.check_in, record.check_out))
        {
            return Err(EngineError::validation(format!(
                "break {} at {} falls outside the adjusted check-in/check-out",
                session.sequence, session.start_time
            )));
        }

        record.adjustments.push(AdjustmentAudit {
            adjusted_by: adjustment.adjusted_by.clone(),
            adjusted_at: Utc::now(),
            reason: adjustment.reason,
        });

        if policies.breaks.fixed_break_mode && sessions.is_empty() && record.is_checked_out() {
            sessions = self.store_fixed_breaks(&record, policies).await?;
        }
        self.recompute(&mut record, &sessions, policies).await?;
        self.ctx.attendance.update_record(record.clone()).await?;

        tracing::info!(
            record_id = %record.id,
            employee_id = %record.employee_id,
            adjusted_by = %adjustment.adjusted_by,
            "attendance adjusted"
        );
        Ok(record)
    }

    /// Opens a break session at `at` on the employee's current record.
    ///
    /// # Errors
    ///
    /// - `Validation` when tracking is off, fixed mode is on, there is no
    ///   check-in, the record is checked out, or `at` precedes check-in
    /// - `Conflict` when a session is open, the daily cap is reached, or `at`
    ///   falls inside a completed session
    pub async fn start_break(&self, employee_id: &str, at: NaiveDateTime) -> EngineResult<BreakRecord> {
        let employee = self.employee(employee_id).await?;
        let snapshot = self.snapshot(&employee.company_id).await?;
        let policies = &snapshot.policies;

        let current = self
            .current_record(employee_id, at.date())
            .await?
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "no check-in recorded for {employee_id} on {}",
                    at.date()
                ))
            })?;
        let _guard = self.locks.acquire(current.id).await;
        let mut record = self.record(current.id).await?;

        let start = round_time(at, policies.attendance.break_start_rounding.as_ref());
        let mut sessions = self.ctx.attendance.list_breaks(record.id).await?;
        validate_break_start(&record, &sessions, start, &policies.breaks)?;

        let sequence = u32::try_from(sessions.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let session = open_session(&record, sequence, start, &policies.attendance.night_window);
        self.ctx.attendance.save_break(session.clone()).await?;
        sessions.push(session.clone());

        self.recompute(&mut record, &sessions, policies).await?;
        self.ctx.attendance.update_record(record).await?;

        tracing::info!(
            employee_id,
            break_id = %session.id,
            sequence,
            "break started"
        );
        Ok(session)
    }

    /// Ends the employee's break session `break_id` at `at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist or belongs to someone else
    /// - `Conflict` if it has already ended
    /// - `Validation` if `at` precedes the start
    pub async fn end_break(
        &self,
        employee_id: &str,
        break_id: Uuid,
        at: NaiveDateTime,
    ) -> EngineResult<BreakRecord> {
        let owner = self.session(break_id).await?.attendance_id;
        let _guard = self.locks.acquire(owner).await;
        let mut session = self.session(break_id).await?;
        let mut record = self.record(owner).await?;
        let snapshot = self.snapshot(&record.company_id).await?;
        let policies = &snapshot.policies;

        let end = round_time(at, policies.attendance.break_end_rounding.as_ref());
        validate_break_end(&session, employee_id, end)?;
        close_session(
            &mut session,
            end,
            &policies.breaks,
            &policies.attendance.night_window,
        );
        self.ctx.attendance.save_break(session.clone()).await?;
        self.refresh(&mut record, policies).await?;

        tracing::info!(
            employee_id,
            break_id = %session.id,
            actual_minutes = session.actual_minutes.unwrap_or(0),
            effective_minutes = session.effective_minutes.unwrap_or(0),
            "break ended"
        );
        Ok(session)
    }

    /// Replaces the start and end of a break session and recomputes its record.
    ///
    /// The new interval must stay inside the record's check-in/check-out and
    /// must not overlap any other completed session of the record.
    pub async fn adjust_break(
        &self,
        break_id: Uuid,
        adjustment: BreakAdjustment,
    ) -> EngineResult<BreakRecord> {
        require_reason(&adjustment.reason)?;
        let owner = self.session(break_id).await?.attendance_id;
        let _guard = self.locks.acquire(owner).await;
        let mut session = self.session(break_id).await?;
        let mut record = self.record(owner).await?;
        let snapshot = self.snapshot(&record.company_id).await?;
        let policies = &snapshot.policies;
        let attendance = &policies.attendance;

        let start = round_time(adjustment.start, attendance.break_start_rounding.as_ref());
        let end = round_time(adjustment.end, attendance.break_end_rounding.as_ref());
        if end < start {
            return Err(EngineError::validation(format!(
                "break end {end} precedes start {start}"
            )));
        }
        if record.check_in.is_some_and(|check_in| start < check_in) {
            return Err(EngineError::validation("break cannot start before check-in"));
        }
        if record.check_out.is_some_and(|check_out| end > check_out) {
            return Err(EngineError::validation("break cannot end after check-out"));
        }

        let sessions = self.ctx.attendance.list_breaks(record.id).await?;
        let overlapping = sessions
            .iter()
            .filter(|other| other.id != session.id)
            .filter_map(BreakRecord::interval)
            .any(|(other_start, other_end)| start <= other_end && other_start <= end);
        if overlapping {
            return Err(EngineError::conflict(format!(
                "break {start}..{end} overlaps another break"
            )));
        }

        session.start_time = start;
        close_session(&mut session, end, &policies.breaks, &attendance.night_window);
        self.ctx.attendance.save_break(session.clone()).await?;

        record.adjustments.push(AdjustmentAudit {
            adjusted_by: adjustment.adjusted_by.clone(),
            adjusted_at: Utc::now(),
            reason: format!("break {}: {}", session.sequence, adjustment.reason),
        });
        self.refresh(&mut record, policies).await?;

        tracing::info!(
            record_id = %record.id,
            break_id = %session.id,
            adjusted_by = %adjustment.adjusted_by,
            "break adjusted"
        );
        Ok(session)
    }

    /// Records a day of absence.
    ///
    /// # Errors
    ///
    /// `Conflict` if the employee already has a record for `date`.
    pub async fn mark_absent(&self, employee_id: &str, date: NaiveDate) -> EngineResult<AttendanceRecord> {
        let employee = self.employee(employee_id).await?;
        if self
            .ctx
            .attendance
            .find_record(employee_id, date)
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "attendance for {employee_id} on {date} already exists"
            )));
        }

        let mut record = AttendanceRecord::absent(employee_id, &employee.company_id, date);
        record.day_type = get_day_type(date, self.ctx.calendar.as_ref());
        self.ctx.attendance.insert_record(record.clone()).await?;

        tracing::info!(employee_id, %date, "marked absent");
        Ok(record)
    }

    /// Synthesizes fixed-mode breaks for a checked-out record that has none.
    ///
    /// Returns the record unchanged when fixed mode is off, the record is
    /// still open, or sessions already exist.
    pub async fn ensure_fixed_breaks(
        &self,
        record: AttendanceRecord,
        policies: &PolicySet,
    ) -> EngineResult<AttendanceRecord> {
        if !policies.breaks.fixed_break_mode || !record.is_checked_out() {
            return Ok(record);
        }
        let _guard = self.locks.acquire(record.id).await;
        let mut record = self.record(record.id).await?;
        if !record.is_checked_out() || !self.ctx.attendance.list_breaks(record.id).await?.is_empty() {
            return Ok(record);
        }

        let sessions = self.store_fixed_breaks(&record, policies).await?;
        self.recompute(&mut record, &sessions, policies).await?;
        self.ctx.attendance.update_record(record.clone()).await?;
        Ok(record)
    }

    /// Lists the break sessions of a record.
    pub async fn breaks(&self, record_id: Uuid) -> EngineResult<Vec<BreakRecord>> {
        self.ctx.attendance.list_breaks(record_id).await
    }

    async fn snapshot(&self, company_id: &str) -> EngineResult<PolicySnapshot> {
        PolicySnapshot::capture(self.ctx.policies.as_ref(), company_id).await
    }

    async fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.ctx
            .employees
            .get_employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    async fn active_employee(&self, employee_id: &str) -> EngineResult<Employee> {
        let employee = self.employee(employee_id).await?;
        if !employee.active {
            return Err(EngineError::validation(format!(
                "employee {employee_id} is not active"
            )));
        }
        Ok(employee)
    }

    async fn record(&self, record_id: Uuid) -> EngineResult<AttendanceRecord> {
        self.ctx
            .attendance
            .get_record(record_id)
            .await?
            .ok_or_else(|| EngineError::not_found("attendance record", record_id))
    }

    async fn session(&self, break_id: Uuid) -> EngineResult<BreakRecord> {
        self.ctx
            .attendance
            .get_break(break_id)
            .await?
            .ok_or_else(|| EngineError::not_found("break", break_id))
    }

    /// Today's record, or yesterday's while it is still open.
    async fn current_record(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        if let Some(record) = self.ctx.attendance.find_record(employee_id, date).await? {
            return Ok(Some(record));
        }
        let Some(previous) = date.pred_opt() else {
            return Ok(None);
        };
        Ok(self
            .ctx
            .attendance
            .find_record(employee_id, previous)
            .await?
            .filter(|r| r.check_in.is_some() && !r.is_checked_out()))
    }

    async fn schedule_for(
        &self,
        record: &AttendanceRecord,
        policies: &PolicySet,
    ) -> EngineResult<ResolvedSchedule> {
        let resolved = self
            .ctx
            .schedules
            .resolve_schedule(&record.employee_id, record.work_date)
            .await?;
        Ok(resolved.unwrap_or_else(|| {
            ResolvedSchedule::on_date(
                record.work_date,
                policies.attendance.default_start,
                policies.attendance.default_end,
                policies.breaks.default_break_minutes,
            )
        }))
    }

    async fn recompute(
        &self,
        record: &mut AttendanceRecord,
        sessions: &[BreakRecord],
        policies: &PolicySet,
    ) -> EngineResult<()> {
        let schedule = self.schedule_for(record, policies).await?;
        let day_type = get_day_type(record.work_date, self.ctx.calendar.as_ref());
        recompute_attendance(record, sessions, &schedule, day_type, policies);
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Reloads every session of `record`, recomputes, and stores it.
    async fn refresh(&self, record: &mut AttendanceRecord, policies: &PolicySet) -> EngineResult<()> {
        let sessions = self.ctx.attendance.list_breaks(record.id).await?;
        self.recompute(record, &sessions, policies).await?;
        self.ctx.attendance.update_record(record.clone()).await
    }

    async fn store_fixed_breaks(
        &self,
        record: &AttendanceRecord,
        policies: &PolicySet,
    ) -> EngineResult<Vec<BreakRecord>> {
        let sessions =
            synthesize_fixed_breaks(record, &policies.breaks, &policies.attendance.night_window);
        for session in &sessions {
            self.ctx.attendance.save_break(session.clone()).await?;
        }
        tracing::debug!(
            record_id = %record.id,
            sessions = sessions.len(),
            "fixed breaks synthesized"
        );
        Ok(sessions)
    }
}

/// Whether a session lies inside `[check_in, check_out]`.
///
/// Open sessions only need to start after check-in.
fn break_within(
    session: &BreakRecord,
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
) -> bool {
    let end = session.end_time.unwrap_or(session.start_time);
    check_in.is_none_or(|check_in| session.start_time >= check_in)
        && check_out.is_none_or(|check_out| end <= check_out)
}

fn require_reason(reason: &str) -> EngineResult<()> {
    if reason.trim().is_empty() {
        return Err(EngineError::validation("a reason is required"));
    }
    Ok(())
}

/// Checks device metadata against the location and IP policy.
fn validate_device(device: Option<&DeviceMeta>, config: &AttendanceConfig) -> EngineResult<()> {
    if config.require_location {
        let coordinates = device.and_then(|d| d.latitude.zip(d.longitude));
        let Some((latitude, longitude)) = coordinates else {
            return Err(EngineError::validation("location is required"));
        };
        if !config.allowed_locations.is_empty()
            && !config
                .allowed_locations
                .iter()
                .any(|fence| within_fence(fence, latitude, longitude))
        {
            return Err(EngineError::validation(format!(
                "location ({latitude}, {longitude}) is outside every allowed site"
            )));
        }
    }

    if !config.allowed_ip_addresses.is_empty() {
        let ip = device.and_then(|d| d.ip_address.as_deref());
        match ip {
            Some(ip) if config.allowed_ip_addresses.iter().any(|allowed| allowed == ip) => {}
            Some(ip) => {
                return Err(EngineError::validation(format!(
                    "IP address {ip} is not allowed"
                )));
            }
            None => return Err(EngineError::validation("IP address is required")),
        }
    }
    Ok(())
}

fn within_fence(fence: &GeoFence, latitude: f64, longitude: f64) -> bool {
    distance_meters(fence.latitude, fence.longitude, latitude, longitude) <= fence.radius_meters
}

/// Great-circle distance by the haversine formula.
fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}
