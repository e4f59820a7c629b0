use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EmployeeStore, MAX_EMAIL_ATTEMPTS};
use crate::errors::AppError;
use crate::models::employee::{
    Employee, EmployeeFields, EmployeeRow, IdentificationType, DEFAULT_STATUS,
};
use crate::utils::email;
use crate::utils::pagination::PageRequest;
use crate::utils::validation::DUPLICATE_IDENTIFICATION;

const EMAIL_CONSTRAINT: &str = "employees_email_key";
const IDENTIFICATION_CONSTRAINT: &str = "employees_identificacion_key";

#[derive(Clone)]
pub struct PgEmployeeStore {
    pool: PgPool,
}

impl PgEmployeeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Name of the unique constraint a failed write tripped over, if any.
fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint(),
        _ => None,
    }
}

fn duplicate_identification() -> AppError {
    AppError::field("numero_identificacion", DUPLICATE_IDENTIFICATION)
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn list(&self, page: Option<PageRequest>) -> Result<(Vec<Employee>, u64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;

        // NULL limit and offset select everything; out-of-range values clamp to i64::MAX.
        let limit = page.map(|p| i64::try_from(p.limit()).unwrap_or(i64::MAX));
        let offset = page.map(|p| i64::try_from(p.offset()).unwrap_or(i64::MAX));

        let rows = sqlx::query_as::<_, EmployeeRow>(
            "SELECT * FROM employees ORDER BY fecha_registro DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let employees = rows
            .into_iter()
            .map(Employee::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((employees, u64::try_from(total).unwrap_or_default()))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Employee::try_from)
            .transpose()
    }

    async fn identification_taken(
        &self,
        tipo: IdentificationType,
        numero: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees \
             WHERE tipo_identificacion = $1 AND numero_identificacion = $2 \
             AND ($3::uuid IS NULL OR id <> $3))",
        )
        .bind(tipo.as_str())
        .bind(numero)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn insert(&self, fields: EmployeeFields) -> Result<Employee, AppError> {
        let base = email::base_local_part(&fields.primer_nombre, &fields.primer_apellido);
        let domain = fields.pais_empleo.email_domain();
        let pattern = email::candidates_pattern(&base, domain);

        for attempt in 1..=MAX_EMAIL_ATTEMPTS {
            let taken =
                sqlx::query_scalar::<_, String>("SELECT email FROM employees WHERE email LIKE $1")
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?;
            let address = email::first_available(&base, domain, taken.iter().map(String::as_str));

            let inserted = sqlx::query_as::<_, EmployeeRow>(
                "INSERT INTO employees (id, primer_apellido, segundo_apellido, primer_nombre, \
                 segundo_nombre, pais_empleo, tipo_identificacion, numero_identificacion, email, \
                 fecha_ingreso, area, estado, fecha_registro) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
            )
            .bind(Uuid::new_v4())
            .bind(&fields.primer_apellido)
            .bind(&fields.segundo_apellido)
            .bind(&fields.primer_nombre)
            .bind(&fields.segundo_nombre)
            .bind(fields.pais_empleo.as_str())
            .bind(fields.tipo_identificacion.as_str())
            .bind(&fields.numero_identificacion)
            .bind(&address)
            .bind(fields.fecha_ingreso)
            .bind(fields.area.as_str())
            .bind(DEFAULT_STATUS)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Ok(row) => return Employee::try_from(row),
                Err(err) if unique_violation(&err) == Some(EMAIL_CONSTRAINT) => {
                    warn!(
                        "Email {} was taken concurrently (attempt {}/{})",
                        address, attempt, MAX_EMAIL_ATTEMPTS
                    );
                }
                Err(err) if unique_violation(&err) == Some(IDENTIFICATION_CONSTRAINT) => {
                    return Err(duplicate_identification());
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::Conflict(format!(
            "No se pudo reservar un email para {}@{}, intente de nuevo.",
            base, domain
        )))
    }

    async fn update(&self, id: Uuid, fields: EmployeeFields) -> Result<Option<Employee>, AppError> {
        let updated = sqlx::query_as::<_, EmployeeRow>(
            "UPDATE employees SET primer_apellido = $1, segundo_apellido = $2, primer_nombre = $3, \
             segundo_nombre = $4, pais_empleo = $5, tipo_identificacion = $6, \
             numero_identificacion = $7, fecha_ingreso = $8, area = $9 \
             WHERE id = $10 RETURNING *",
        )
        .bind(&fields.primer_apellido)
        .bind(&fields.segundo_apellido)
        .bind(&fields.primer_nombre)
        .bind(&fields.segundo_nombre)
        .bind(fields.pais_empleo.as_str())
        .bind(fields.tipo_identificacion.as_str())
        .bind(&fields.numero_identificacion)
        .bind(fields.fecha_ingreso)
        .bind(fields.area.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(row) => row.map(Employee::try_from).transpose(),
            Err(err) if unique_violation(&err) == Some(IDENTIFICATION_CONSTRAINT) => {
                Err(duplicate_identification())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
