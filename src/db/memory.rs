//! In-memory employee store for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeFields, IdentificationType, DEFAULT_STATUS};
use crate::utils::email;
use crate::utils::pagination::PageRequest;
use crate::utils::validation::DUPLICATE_IDENTIFICATION;

/// Records kept in insertion order. Every write holds the lock for the whole
/// check-and-store, so uniqueness cannot race.
#[derive(Clone, Default)]
pub struct InMemoryEmployeeStore {
    employees: Arc<RwLock<Vec<Employee>>>,
}

impl InMemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn clashes(employees: &[Employee], fields: &EmployeeFields, exclude: Option<Uuid>) -> bool {
    employees.iter().any(|e| {
        Some(e.id) != exclude
            && e.tipo_identificacion == fields.tipo_identificacion
            && e.numero_identificacion == fields.numero_identificacion
    })
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeStore {
    async fn list(&self, page: Option<PageRequest>) -> Result<(Vec<Employee>, u64), AppError> {
        let employees = self.employees.read().await;

        let mut newest_first: Vec<Employee> = employees.iter().rev().cloned().collect();
        newest_first.sort_by(|a, b| b.fecha_registro.cmp(&a.fecha_registro));

        let total = newest_first.len() as u64;
        let selected = match page {
            Some(page) => newest_first
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
                .collect(),
            None => newest_first,
        };

        Ok((selected, total))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let employees = self.employees.read().await;
        Ok(employees.iter().find(|e| e.id == id).cloned())
    }

    async fn identification_taken(
        &self,
        tipo: IdentificationType,
        numero: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let employees = self.employees.read().await;
        Ok(employees.iter().any(|e| {
            Some(e.id) != exclude && e.tipo_identificacion == tipo && e.numero_identificacion == numero
        }))
    }

    async fn insert(&self, fields: EmployeeFields) -> Result<Employee, AppError> {
        let mut employees = self.employees.write().await;

        if clashes(&employees, &fields, None) {
            return Err(AppError::field("numero_identificacion", DUPLICATE_IDENTIFICATION));
        }

        let address = email::first_available(
            &email::base_local_part(&fields.primer_nombre, &fields.primer_apellido),
            fields.pais_empleo.email_domain(),
            employees.iter().map(|e| e.email.as_str()),
        );

        let employee = Employee {
            id: Uuid::new_v4(),
            primer_apellido: fields.primer_apellido,
            segundo_apellido: fields.segundo_apellido,
            primer_nombre: fields.primer_nombre,
            segundo_nombre: fields.segundo_nombre,
            pais_empleo: fields.pais_empleo,
            tipo_identificacion: fields.tipo_identificacion,
            numero_identificacion: fields.numero_identificacion,
            email: address,
            fecha_ingreso: fields.fecha_ingreso,
            area: fields.area,
            estado: DEFAULT_STATUS.to_string(),
            fecha_registro: Utc::now(),
        };
        employees.push(employee.clone());

        Ok(employee)
    }

    async fn update(&self, id: Uuid, fields: EmployeeFields) -> Result<Option<Employee>, AppError> {
        let mut employees = self.employees.write().await;

        if clashes(&employees, &fields, Some(id)) {
            return Err(AppError::field("numero_identificacion", DUPLICATE_IDENTIFICATION));
        }

        match employees.iter_mut().find(|e| e.id == id) {
            Some(employee) => {
                employee.apply(fields);
                Ok(Some(employee.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut employees = self.employees.write().await;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        Ok(employees.len() < before)
    }
}
