// Booking orchestration
// Every step of a booking runs inside one database transaction: reference
// checks, slot pre-check, discount evaluation, wallet debit, insert. Any
// failure rolls the whole attempt back, so a refused insert also undoes
// the debit.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::doctors::repository::DoctorsRepository;
use crate::patients::repository::PatientsRepository;
use crate::wallet::WalletLedger;

use super::discount::{self, Verdict};
use super::error::AppointmentError;
use super::models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, BookingResponse,
    CancelAppointmentRequest, NewAppointment,
};
use super::repository::AppointmentsRepository;
use super::status_machine::StatusMachine;
use super::time_rules::TimeRuleValidator;

/// Slot length; doctors see at most one live appointment per hour
const SLOT_HOURS: i64 = 1;

#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    repository: AppointmentsRepository,
}

impl BookingService {
    pub fn new(pool: PgPool) -> Self {
        let repository = AppointmentsRepository::new(pool.clone());
        Self { pool, repository }
    }

    /// Book an appointment, optionally taking the flat discount
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookingResponse, AppointmentError> {
        let now = Utc::now();
        let appointment_date = TimeRuleValidator::validate(&request.appointment_date, now)
            .map_err(AppointmentError::InvalidSchedule)?;

        let mut tx = self.pool.begin().await?;

        if !PatientsRepository::exists(&mut *tx, request.patient_id).await? {
            return Err(AppointmentError::PatientNotFound);
        }
        let doctor = DoctorsRepository::fetch_in(&mut *tx, request.doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;

        let slot_end = appointment_date + Duration::hours(SLOT_HOURS);
        if AppointmentsRepository::slot_taken(&mut *tx, doctor.id, appointment_date, slot_end)
            .await?
        {
            return Err(AppointmentError::SlotTaken);
        }

        // Generated up front so the debit entry can reference the row
        // inserted afterwards.
        let appointment_id = Uuid::new_v4();
        let mut discount_reference = None;

        if request.discount_used {
            let context = AppointmentsRepository::discount_context(
                &mut *tx,
                request.patient_id,
                doctor.id,
            )
            .await?;

            match discount::evaluate(&context, now) {
                Verdict::Ineligible(refusal) => {
                    return Err(AppointmentError::DiscountIneligible(refusal));
                }
                Verdict::Eligible(grant) => {
                    let description =
                        format!("Appointment discount ({}) with Dr. {}", grant.as_str(), doctor.name);
                    let (_, entry) = WalletLedger::debit_within(
                        &mut *tx,
                        request.patient_id,
                        discount::discount_amount(),
                        Some(&description),
                        Some(appointment_id),
                        now,
                    )
                    .await?;
                    discount_reference = Some(entry.reference_id);
                }
            }
        }

        let appointment = AppointmentsRepository::insert(
            &mut *tx,
            &NewAppointment {
                id: appointment_id,
                patient_id: request.patient_id,
                doctor_id: doctor.id,
                appointment_date,
                reason: request.reason,
                discount_used: request.discount_used,
                fees_amount: doctor.fees,
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            "booked appointment {} for patient {} with doctor {} at {}",
            appointment.id, appointment.patient_id, appointment.doctor_id,
            appointment.appointment_date
        );
        Ok(BookingResponse {
            appointment,
            discount_reference,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list(
        &self,
        query: &super::models::AppointmentQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.repository.list(query).await?)
    }

    /// Move an appointment to a new status, enforcing the status machine
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get(id).await?;

        if !StatusMachine::can_transition(current.status, new_status) {
            return Err(AppointmentError::InvalidTransition {
                from: current.status.to_string(),
                to: new_status.to_string(),
            });
        }
        if StatusMachine::is_noop(current.status, new_status) {
            return Ok(current);
        }

        self.repository
            .update_status(id, new_status)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Cancel a scheduled appointment, recording who cancelled and why
    pub async fn cancel(
        &self,
        id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get(id).await?;

        if !StatusMachine::can_transition(current.status, AppointmentStatus::Cancelled) {
            return Err(AppointmentError::InvalidTransition {
                from: current.status.to_string(),
                to: AppointmentStatus::Cancelled.to_string(),
            });
        }
        if StatusMachine::is_noop(current.status, AppointmentStatus::Cancelled) {
            return Ok(current);
        }

        self.repository
            .cancel(id, request.reason.as_deref(), request.cancelled_by)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppointmentError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(AppointmentError::NotFound)
        }
    }
}
