//! Appointments repository (Postgres)

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{AppointmentStore, SLOT_TAKEN};
use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::AppointmentRow, hhmm, Appointment, AppointmentFilter, AppointmentPatch,
        AppointmentStatus, NewAppointment,
    },
};

#[derive(Clone)]
pub struct PgAppointmentStore {
    pool: Pool<Postgres>,
}

impl PgAppointmentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn into_domain(rows: Vec<AppointmentRow>) -> AppResult<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn list(&self, filter: &AppointmentFilter) -> AppResult<Vec<Appointment>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.fecha.is_some() {
            conditions.push(format!("fecha = ${}", idx));
            idx += 1;
        }
        if filter.desde.is_some() {
            conditions.push(format!("fecha >= ${}", idx));
            idx += 1;
        }
        if filter.hasta.is_some() {
            conditions.push(format!("fecha <= ${}", idx));
            idx += 1;
        }
        if filter.barbero_id.is_some() {
            conditions.push(format!("barbero_id = ${}", idx));
            idx += 1;
        }
        if filter.estado.is_some() {
            conditions.push(format!("estado = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM appointments {} ORDER BY fecha ASC, hora ASC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, AppointmentRow>(&query);
        if let Some(f) = filter.fecha { builder = builder.bind(f); }
        if let Some(d) = filter.desde { builder = builder.bind(d); }
        if let Some(h) = filter.hasta { builder = builder.bind(h); }
        if let Some(b) = filter.barbero_id { builder = builder.bind(b); }
        if let Some(e) = filter.estado { builder = builder.bind(e.as_str()); }

        let rows = builder.fetch_all(&self.pool).await?;
        into_domain(rows)
    }

    async fn get(&self, id: Uuid) -> AppResult<Appointment> {
        sqlx::query_as::<_, AppointmentRow>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?
            .try_into()
    }

    async fn find_at(&self, fecha: NaiveDate, hora: NaiveTime) -> AppResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            "SELECT * FROM appointments WHERE fecha = $1 AND hora = $2 AND estado <> $3 LIMIT 1",
        )
        .bind(fecha)
        .bind(hhmm::format(&hora))
        .bind(AppointmentStatus::Cancelled.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Appointment::try_from).transpose()
    }

    async fn insert(&self, data: NewAppointment) -> AppResult<Appointment> {
        // appointments_slot_unique turns a concurrent double booking into a unique violation
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            INSERT INTO appointments (
                id, nombre_cliente, email, whatsapp, fecha, hora,
                servicio, servicio_id, precio, duracion, estado,
                barbero_id, barbero_nombre, monto_sena, sena_pagada
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.nombre_cliente)
        .bind(&data.email)
        .bind(&data.whatsapp)
        .bind(data.fecha)
        .bind(hhmm::format(&data.hora))
        .bind(&data.servicio)
        .bind(&data.servicio_id)
        .bind(data.precio)
        .bind(&data.duracion)
        .bind(data.estado.as_str())
        .bind(data.barbero_id)
        .bind(&data.barbero_nombre)
        .bind(data.monto_sena)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_insert(e, SLOT_TAKEN))?;

        row.try_into()
    }

    async fn update(&self, id: Uuid, patch: &AppointmentPatch) -> AppResult<Appointment> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let mut sets = Vec::new();
        let mut idx = 1;

        if patch.estado.is_some() {
            sets.push(format!("estado = ${}", idx));
            idx += 1;
        }
        if patch.barbero.is_some() {
            sets.push(format!("barbero_id = ${}", idx));
            sets.push(format!("barbero_nombre = ${}", idx + 1));
            idx += 2;
        }
        if patch.deposit.is_some() {
            sets.push(format!("monto_sena = ${}", idx));
            sets.push(format!("sena_pagada = ${}", idx + 1));
            sets.push(format!("fecha_pago_sena = ${}", idx + 2));
            idx += 3;
        }

        let query = format!(
            "UPDATE appointments SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, AppointmentRow>(&query);
        if let Some(estado) = patch.estado { builder = builder.bind(estado.as_str()); }
        if let Some((barbero_id, ref nombre)) = patch.barbero {
            builder = builder.bind(barbero_id).bind(nombre.clone());
        }
        if let Some(ref deposit) = patch.deposit {
            builder = builder
                .bind(deposit.monto_sena)
                .bind(deposit.sena_pagada)
                .bind(deposit.fecha_pago_sena);
        }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            // re-activating a cancelled appointment can collide with a newer booking
            .map_err(|e| AppError::from_insert(e, SLOT_TAKEN))?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?
            .try_into()
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM appointments LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }
}
