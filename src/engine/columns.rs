//! Column names of the admissions table

pub const NAME: &str = "NOMBRE";
pub const REGION: &str = "COMUNIDAD_AUTONOMA";
/// Raw `MM/DD/YY` birth date
pub const BIRTH_DATE: &str = "FECHA_DE_NACIMIENTO";
pub const SEX: &str = "SEXO";
/// Grouped diagnosis category
pub const DIAGNOSIS: &str = "CATEGORIA";
pub const CENTER: &str = "CENTRO_RECODIFICADO";
pub const ADMISSION_DATE: &str = "FECHA_DE_INGRESO";
pub const CONTACT_END_DATE: &str = "FECHA_DE_FIN_CONTACTO";
pub const LENGTH_OF_STAY: &str = "ESTANCIA_DIAS";
