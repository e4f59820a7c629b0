use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AppError;

pub const DEFAULT_STATUS: &str = "Activo";

const REGISTERED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Country {
    #[default]
    #[serde(rename = "Colombia")]
    Colombia,
    #[serde(rename = "Estados Unidos")]
    UnitedStates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IdentificationType {
    #[serde(rename = "Cédula de Ciudadanía")]
    NationalId,
    #[serde(rename = "Cédula de Extranjería")]
    ForeignResidentId,
    #[serde(rename = "Pasaporte")]
    Passport,
    #[serde(rename = "Permiso Especial")]
    SpecialPermit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Area {
    #[serde(rename = "Administración")]
    Administration,
    #[serde(rename = "Financiera")]
    Finance,
    #[serde(rename = "Compras")]
    Purchasing,
    #[serde(rename = "Infraestructura")]
    Infrastructure,
    #[serde(rename = "Operación")]
    Operations,
    #[serde(rename = "Talento Humano")]
    HumanResources,
    #[serde(rename = "Servicios Varios")]
    GeneralServices,
}

/// Maps a choice enum to the label stored in the database and sent over the wire.
macro_rules! choice_labels {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    other => Err(AppError::BadRequest(format!(
                        "\"{}\" no es una elección válida.",
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_labels!(Country {
    Colombia => "Colombia",
    UnitedStates => "Estados Unidos",
});

choice_labels!(IdentificationType {
    NationalId => "Cédula de Ciudadanía",
    ForeignResidentId => "Cédula de Extranjería",
    Passport => "Pasaporte",
    SpecialPermit => "Permiso Especial",
});

choice_labels!(Area {
    Administration => "Administración",
    Finance => "Financiera",
    Purchasing => "Compras",
    Infrastructure => "Infraestructura",
    Operations => "Operación",
    HumanResources => "Talento Humano",
    GeneralServices => "Servicios Varios",
});

impl Country {
    pub fn email_domain(&self) -> &'static str {
        match self {
            Country::Colombia => "cidenet.com.co",
            _ => "cidenet.com.us",
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub primer_nombre: String,
    pub segundo_nombre: Option<String>,
    pub pais_empleo: Country,
    pub tipo_identificacion: IdentificationType,
    pub numero_identificacion: String,
    pub email: String,
    pub fecha_ingreso: NaiveDate,
    pub area: Area,
    pub estado: String,
    #[serde(serialize_with = "serialize_registered_at")]
    pub fecha_registro: DateTime<Utc>,
}

fn serialize_registered_at<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(REGISTERED_AT_FORMAT))
}

/// A validated set of writable fields, ready to be inserted or applied to an
/// existing row. Email, status and the registration timestamp are owned by
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeFields {
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub primer_nombre: String,
    pub segundo_nombre: Option<String>,
    pub pais_empleo: Country,
    pub tipo_identificacion: IdentificationType,
    pub numero_identificacion: String,
    pub fecha_ingreso: NaiveDate,
    pub area: Area,
}

impl Employee {
    pub fn fields(&self) -> EmployeeFields {
        EmployeeFields {
            primer_apellido: self.primer_apellido.clone(),
            segundo_apellido: self.segundo_apellido.clone(),
            primer_nombre: self.primer_nombre.clone(),
            segundo_nombre: self.segundo_nombre.clone(),
            pais_empleo: self.pais_empleo,
            tipo_identificacion: self.tipo_identificacion,
            numero_identificacion: self.numero_identificacion.clone(),
            fecha_ingreso: self.fecha_ingreso,
            area: self.area,
        }
    }

    pub fn apply(&mut self, fields: EmployeeFields) {
        self.primer_apellido = fields.primer_apellido;
        self.segundo_apellido = fields.segundo_apellido;
        self.primer_nombre = fields.primer_nombre;
        self.segundo_nombre = fields.segundo_nombre;
        self.pais_empleo = fields.pais_empleo;
        self.tipo_identificacion = fields.tipo_identificacion;
        self.numero_identificacion = fields.numero_identificacion;
        self.fecha_ingreso = fields.fecha_ingreso;
        self.area = fields.area;
    }
}

/// Raw `employees` row; choice columns are stored as their labels.
#[derive(sqlx::FromRow, Debug)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub primer_nombre: String,
    pub segundo_nombre: Option<String>,
    pub pais_empleo: String,
    pub tipo_identificacion: String,
    pub numero_identificacion: String,
    pub email: String,
    pub fecha_ingreso: NaiveDate,
    pub area: String,
    pub estado: String,
    pub fecha_registro: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = AppError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let corrupt =
            |_| AppError::DatabaseError(format!("Invalid choice value stored for employee {}", row.id));

        Ok(Employee {
            id: row.id,
            pais_empleo: row.pais_empleo.parse().map_err(corrupt)?,
            tipo_identificacion: row.tipo_identificacion.parse().map_err(corrupt)?,
            area: row.area.parse().map_err(corrupt)?,
            primer_apellido: row.primer_apellido,
            segundo_apellido: row.segundo_apellido,
            primer_nombre: row.primer_nombre,
            segundo_nombre: row.segundo_nombre,
            numero_identificacion: row.numero_identificacion,
            email: row.email,
            fecha_ingreso: row.fecha_ingreso,
            estado: row.estado,
            fecha_registro: row.fecha_registro,
        })
    }
}
