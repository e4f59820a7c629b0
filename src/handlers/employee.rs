use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::config::AppConfig;
use crate::db::EmployeeStore;
use crate::errors::AppError;
use crate::models::employee::{EmployeeFields, IdentificationType};
use crate::utils::pagination::PageQuery;
use crate::utils::validation::{
    lenient_text, parse_join_date, validate_area, validate_country, validate_digits,
    validate_identification_type, validate_join_date, validate_letters,
    validate_optional_letters, validate_other_names, validate_payload, BAD_DATE, DATE_FORMAT,
    DUPLICATE_IDENTIFICATION, REQUIRED,
};

/// Writable employee fields as sent by clients. Everything is optional at the
/// wire level so a single pass can report every missing or malformed field.
/// `id`, `email`, `estado` and `fecha_registro` are read-only and ignored.
#[derive(Deserialize, Validate, Debug, Default, Clone)]
pub struct EmployeePayload {
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        required(message = "Este campo es requerido."),
        length(max = 20, message = "Asegúrese de que este campo no tenga más de 20 caracteres."),
        custom = "validate_letters"
    )]
    primer_apellido: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        length(max = 20, message = "Asegúrese de que este campo no tenga más de 20 caracteres."),
        custom = "validate_optional_letters"
    )]
    segundo_apellido: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        required(message = "Este campo es requerido."),
        length(max = 20, message = "Asegúrese de que este campo no tenga más de 20 caracteres."),
        custom = "validate_letters"
    )]
    primer_nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        length(max = 50, message = "Asegúrese de que este campo no tenga más de 50 caracteres."),
        custom = "validate_other_names"
    )]
    segundo_nombre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(custom = "validate_country")]
    pais_empleo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        required(message = "Este campo es requerido."),
        custom = "validate_identification_type"
    )]
    tipo_identificacion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(
        required(message = "Este campo es requerido."),
        length(max = 20, message = "Asegúrese de que este campo no tenga más de 20 caracteres."),
        custom = "validate_digits"
    )]
    numero_identificacion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required(message = "Este campo es requerido."), custom = "validate_join_date")]
    fecha_ingreso: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(required(message = "Este campo es requerido."), custom = "validate_area")]
    area: Option<String>,
}

impl From<EmployeeFields> for EmployeePayload {
    fn from(fields: EmployeeFields) -> Self {
        EmployeePayload {
            primer_apellido: Some(fields.primer_apellido),
            segundo_apellido: Some(fields.segundo_apellido),
            primer_nombre: Some(fields.primer_nombre),
            segundo_nombre: fields.segundo_nombre,
            pais_empleo: Some(fields.pais_empleo.to_string()),
            tipo_identificacion: Some(fields.tipo_identificacion.to_string()),
            numero_identificacion: Some(fields.numero_identificacion),
            fecha_ingreso: Some(fields.fecha_ingreso.format(DATE_FORMAT).to_string()),
            area: Some(fields.area.to_string()),
        }
    }
}

impl EmployeePayload {
    /// Fields present in `self` win over the stored ones.
    fn merged_over(self, base: EmployeePayload) -> Self {
        EmployeePayload {
            primer_apellido: self.primer_apellido.or(base.primer_apellido),
            segundo_apellido: self.segundo_apellido.or(base.segundo_apellido),
            primer_nombre: self.primer_nombre.or(base.primer_nombre),
            segundo_nombre: self.segundo_nombre.or(base.segundo_nombre),
            pais_empleo: self.pais_empleo.or(base.pais_empleo),
            tipo_identificacion: self.tipo_identificacion.or(base.tipo_identificacion),
            numero_identificacion: self.numero_identificacion.or(base.numero_identificacion),
            fecha_ingreso: self.fecha_ingreso.or(base.fecha_ingreso),
            area: self.area.or(base.area),
        }
    }

    fn into_fields(self) -> Result<EmployeeFields, AppError> {
        fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
            value.ok_or_else(|| AppError::field(field, REQUIRED))
        }

        Ok(EmployeeFields {
            primer_apellido: required(self.primer_apellido, "primer_apellido")?,
            segundo_apellido: self.segundo_apellido.unwrap_or_default(),
            primer_nombre: required(self.primer_nombre, "primer_nombre")?,
            segundo_nombre: self.segundo_nombre.filter(|names| !names.trim().is_empty()),
            pais_empleo: match self.pais_empleo {
                Some(country) => country.parse()?,
                None => Default::default(),
            },
            tipo_identificacion: required(self.tipo_identificacion, "tipo_identificacion")?
                .parse()?,
            numero_identificacion: required(self.numero_identificacion, "numero_identificacion")?,
            fecha_ingreso: parse_join_date(&required(self.fecha_ingreso, "fecha_ingreso")?)
                .map_err(|_| AppError::field("fecha_ingreso", BAD_DATE))?,
            area: required(self.area, "area")?.parse()?,
        })
    }
}

/// Field rules plus the identification uniqueness check, all reported together.
async fn validated_fields(
    store: &dyn EmployeeStore,
    payload: EmployeePayload,
    current: Option<Uuid>,
) -> Result<EmployeeFields, AppError> {
    let mut errors = validate_payload(&payload).err().unwrap_or_default();

    let identification_valid = !errors.contains_key("tipo_identificacion")
        && !errors.contains_key("numero_identificacion");
    if identification_valid {
        if let (Some(tipo), Some(numero)) =
            (&payload.tipo_identificacion, &payload.numero_identificacion)
        {
            let tipo: IdentificationType = tipo.parse()?;
            if store.identification_taken(tipo, numero, current).await? {
                errors
                    .entry("numero_identificacion".to_string())
                    .or_default()
                    .push(DUPLICATE_IDENTIFICATION.to_string());
            }
        }
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    payload.into_fields()
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

fn not_found() -> AppError {
    AppError::NotFound("Empleado no encontrado.".to_string())
}

pub async fn list_employees(
    req: HttpRequest,
    store: web::Data<dyn EmployeeStore>,
    config: web::Data<AppConfig>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = query.resolve(config.page_size, config.max_page_size);
    let (employees, total) = store.list(page).await?;

    match page {
        Some(page) => {
            page.check(total)?;
            let base = {
                let conn = req.connection_info();
                format!("{}://{}{}", conn.scheme(), conn.host(), req.path())
            };
            Ok(HttpResponse::Ok().json(page.wrap(&base, total, employees)))
        }
        None => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "count": employees.len(),
            "message": "Lista de empleados obtenida exitosamente",
            "data": employees,
        }))),
    }
}

pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let fields = validated_fields(store.get_ref(), payload.into_inner(), None).await?;
    let employee = store.insert(fields).await?;

    info!("Employee {} registered as {}", employee.id, employee.email);

    Ok(HttpResponse::Created().json(json!({
        "message": "Empleado registrado exitosamente",
        "data": employee,
    })))
}

pub async fn get_employee(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    let employee = store.get(id).await?.ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": employee,
    })))
}

/// PUT: the body must be a complete record.
pub async fn replace_employee(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<String>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    store.get(id).await?.ok_or_else(not_found)?;

    update(store.get_ref(), id, payload.into_inner()).await
}

/// PATCH: absent fields keep their stored values; the merged record is
/// validated as a whole, join date included.
pub async fn patch_employee(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<String>,
    payload: web::Json<EmployeePayload>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    let existing = store.get(id).await?.ok_or_else(not_found)?;

    let merged = payload.into_inner().merged_over(EmployeePayload::from(existing.fields()));
    update(store.get_ref(), id, merged).await
}

async fn update(
    store: &dyn EmployeeStore,
    id: Uuid,
    payload: EmployeePayload,
) -> Result<HttpResponse, AppError> {
    let fields = validated_fields(store, payload, Some(id)).await?;
    let employee = store.update(id, fields).await?.ok_or_else(not_found)?;

    info!("Employee {} updated", employee.id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Empleado actualizado exitosamente",
        "data": employee,
    })))
}

pub async fn delete_employee(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id)?;
    if !store.delete(id).await? {
        return Err(not_found());
    }

    info!("Employee {} deleted", id);

    Ok(HttpResponse::NoContent().json(json!({
        "success": true,
        "message": "Empleado eliminado exitosamente",
    })))
}
