use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    String,
    Vec3,
    Enum,
    InputFile,
    OutputFile,
}

impl PropertyKind {
    pub fn name(self) -> &'static str {
        match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
            PropertyKind::String => "string",
            PropertyKind::Vec3 => "vec3",
            PropertyKind::Enum => "enum",
            PropertyKind::InputFile => "input_file",
            PropertyKind::OutputFile => "output_file",
        }
    }

    fn zero_value(self) -> ParamValue {
        match self {
            PropertyKind::Bool => ParamValue::Bool(false),
            PropertyKind::Int | PropertyKind::Enum => ParamValue::Int(0),
            PropertyKind::Float => ParamValue::Float(0.0),
            PropertyKind::Vec3 => ParamValue::Vec3([0.0, 0.0, 0.0]),
            PropertyKind::String | PropertyKind::InputFile | PropertyKind::OutputFile => {
                ParamValue::String(String::new())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Vec3([f32; 3]),
}

impl ParamValue {
    pub fn fits(&self, kind: PropertyKind) -> bool {
        matches!(
            (self, kind),
            (ParamValue::Bool(_), PropertyKind::Bool)
                | (ParamValue::Int(_), PropertyKind::Int | PropertyKind::Enum)
                | (ParamValue::Float(_), PropertyKind::Float)
                | (ParamValue::Vec3(_), PropertyKind::Vec3)
                | (
                    ParamValue::String(_),
                    PropertyKind::String | PropertyKind::InputFile | PropertyKind::OutputFile
                )
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumItem {
    pub label: String,
    pub value: i32,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    #[error("unknown property '{0}'")]
    Unknown(String),
    #[error("property '{name}' is of type {expected:?}")]
    TypeMismatch { name: String, expected: PropertyKind },
    #[error("property '{name}' has no enum entry with value {value}")]
    UnknownEnumValue { name: String, value: i32 },
    #[error("property '{name}' has no enum entry labelled '{label}'")]
    UnknownEnumLabel { name: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    value: ParamValue,
    default: ParamValue,
    range: Option<(f32, f32)>,
    pub visible: bool,
    pub tooltip: Option<String>,
    enum_items: Vec<EnumItem>,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        let value = kind.zero_value();
        Self {
            name: name.into(),
            kind,
            default: value.clone(),
            value,
            range: None,
            visible: true,
            tooltip: None,
            enum_items: Vec::new(),
        }
    }

    pub fn range(&mut self, min: f32, max: f32) -> &mut Self {
        self.range = Some((min.min(max), max.max(min)));
        self.value = self.clamped(self.value.clone());
        self
    }

    pub fn default_value(&mut self, value: ParamValue) -> &mut Self {
        if value.fits(self.kind) {
            let value = self.clamped(value);
            self.default = value.clone();
            self.value = value;
        } else {
            tracing::warn!(property = %self.name, "default value {:?} does not fit {:?}", value, self.kind);
        }
        self
    }

    pub fn default_bool(&mut self, value: bool) -> &mut Self {
        self.default_value(ParamValue::Bool(value))
    }

    pub fn default_int(&mut self, value: i32) -> &mut Self {
        self.default_value(ParamValue::Int(value))
    }

    pub fn default_float(&mut self, value: f32) -> &mut Self {
        self.default_value(ParamValue::Float(value))
    }

    pub fn default_vec3(&mut self, value: [f32; 3]) -> &mut Self {
        self.default_value(ParamValue::Vec3(value))
    }

    pub fn default_string(&mut self, value: impl Into<String>) -> &mut Self {
        self.default_value(ParamValue::String(value.into()))
    }

    pub fn tooltip(&mut self, text: impl Into<String>) -> &mut Self {
        self.tooltip = Some(text.into());
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.visible = false;
        self
    }

    /// Sets the enum table; the first entry becomes the default.
    pub fn enum_items(&mut self, items: &[(&str, i32)]) -> &mut Self {
        self.enum_items = items
            .iter()
            .map(|(label, value)| EnumItem {
                label: (*label).to_string(),
                value: *value,
            })
            .collect();
        if let Some(first) = self.enum_items.first() {
            self.default = ParamValue::Int(first.value);
            self.value = self.default.clone();
        }
        self
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn default_param(&self) -> &ParamValue {
        &self.default
    }

    pub fn bounds(&self) -> Option<(f32, f32)> {
        self.range
    }

    pub fn items(&self) -> &[EnumItem] {
        &self.enum_items
    }

    pub fn set(&mut self, value: ParamValue) -> Result<(), PropertyError> {
        if !value.fits(self.kind) {
            return Err(PropertyError::TypeMismatch {
                name: self.name.clone(),
                expected: self.kind,
            });
        }
        if let (PropertyKind::Enum, ParamValue::Int(v)) = (self.kind, &value) {
            if !self.enum_items.iter().any(|item| item.value == *v) {
                return Err(PropertyError::UnknownEnumValue {
                    name: self.name.clone(),
                    value: *v,
                });
            }
            self.value = value;
            return Ok(());
        }
        self.value = self.clamped(value);
        Ok(())
    }

    pub fn set_enum_label(&mut self, label: &str) -> Result<(), PropertyError> {
        let item = self
            .enum_items
            .iter()
            .find(|item| item.label == label)
            .ok_or_else(|| PropertyError::UnknownEnumLabel {
                name: self.name.clone(),
                label: label.to_string(),
            })?;
        self.value = ParamValue::Int(item.value);
        Ok(())
    }

    fn clamped(&self, value: ParamValue) -> ParamValue {
        let Some((min, max)) = self.range else {
            return value;
        };
        match value {
            ParamValue::Int(v) if self.kind == PropertyKind::Int => {
                ParamValue::Int(v.clamp(min.ceil() as i32, max.floor() as i32))
            }
            ParamValue::Float(v) => ParamValue::Float(v.clamp(min, max)),
            ParamValue::Vec3(v) => ParamValue::Vec3(v.map(|c| c.clamp(min, max))),
            other => other,
        }
    }

    fn mismatch(&self) -> PropertyError {
        PropertyError::TypeMismatch {
            name: self.name.clone(),
            expected: self.kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    items: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, kind: PropertyKind) -> &mut Property {
        let property = Property::new(name, kind);
        let index = match self.items.iter().position(|p| p.name == property.name) {
            Some(index) => {
                self.items[index] = property;
                index
            }
            None => {
                self.items.push(property);
                self.items.len() - 1
            }
        };
        &mut self.items[index]
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.items.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.items.iter_mut().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), PropertyError> {
        self.lookup_mut(name)?.set(value)
    }

    pub fn set_enum_label(&mut self, name: &str, label: &str) -> Result<(), PropertyError> {
        self.lookup_mut(name)?.set_enum_label(label)
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<(), PropertyError> {
        self.lookup_mut(name)?.visible = visible;
        Ok(())
    }

    pub fn is_visible(&self, name: &str) -> Result<bool, PropertyError> {
        Ok(self.lookup(name)?.visible)
    }

    pub fn eval_bool(&self, name: &str) -> Result<bool, PropertyError> {
        let property = self.lookup(name)?;
        match property.value {
            ParamValue::Bool(v) => Ok(v),
            _ => Err(property.mismatch()),
        }
    }

    /// Reads int and enum properties.
    pub fn eval_int(&self, name: &str) -> Result<i32, PropertyError> {
        let property = self.lookup(name)?;
        match property.value {
            ParamValue::Int(v) => Ok(v),
            _ => Err(property.mismatch()),
        }
    }

    pub fn eval_float(&self, name: &str) -> Result<f32, PropertyError> {
        let property = self.lookup(name)?;
        match property.value {
            ParamValue::Float(v) => Ok(v),
            _ => Err(property.mismatch()),
        }
    }

    pub fn eval_vec3(&self, name: &str) -> Result<Vec3, PropertyError> {
        let property = self.lookup(name)?;
        match property.value {
            ParamValue::Vec3(v) => Ok(Vec3::from(v)),
            _ => Err(property.mismatch()),
        }
    }

    pub fn eval_string(&self, name: &str) -> Result<&str, PropertyError> {
        let property = self.lookup(name)?;
        match &property.value {
            ParamValue::String(v) => Ok(v.as_str()),
            _ => Err(property.mismatch()),
        }
    }

    pub fn eval_enum(&self, name: &str) -> Result<i32, PropertyError> {
        let property = self.lookup(name)?;
        match (property.kind, &property.value) {
            (PropertyKind::Enum, ParamValue::Int(v)) => Ok(*v),
            _ => Err(property.mismatch()),
        }
    }

    fn lookup(&self, name: &str) -> Result<&Property, PropertyError> {
        self.get(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Property, PropertyError> {
        self.get_mut(name)
            .ok_or_else(|| PropertyError::Unknown(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Properties {
        let mut props = Properties::new();
        props
            .add("Size", PropertyKind::Vec3)
            .range(0.0, 10.0)
            .default_vec3([1.0, 1.0, 1.0]);
        props
            .add("Segments", PropertyKind::Int)
            .range(4.0, 100.0)
            .default_int(48);
        props
            .add("Mode", PropertyKind::Enum)
            .enum_items(&[("Pre Transform", 0), ("Post Transform", 1)]);
        props.add("Flip", PropertyKind::Bool);
        props
    }

    #[test]
    fn defaults_are_readable() {
        let props = sample();
        assert_eq!(props.eval_vec3("Size").unwrap(), Vec3::ONE);
        assert_eq!(props.eval_int("Segments").unwrap(), 48);
        assert_eq!(props.eval_enum("Mode").unwrap(), 0);
        assert!(!props.eval_bool("Flip").unwrap());
    }

    #[test]
    fn set_clamps_into_bounds() {
        let mut props = sample();
        props.set("Segments", ParamValue::Int(1000)).unwrap();
        assert_eq!(props.eval_int("Segments").unwrap(), 100);
        props
            .set("Size", ParamValue::Vec3([-1.0, 5.0, 20.0]))
            .unwrap();
        assert_eq!(props.eval_vec3("Size").unwrap(), Vec3::new(0.0, 5.0, 10.0));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let mut props = sample();
        let err = props.set("Flip", ParamValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { .. }));
        assert!(props.eval_float("Segments").is_err());
        assert!(matches!(
            props.eval_int("Missing"),
            Err(PropertyError::Unknown(_))
        ));
    }

    #[test]
    fn enum_values_come_from_the_table() {
        let mut props = sample();
        assert!(props.set("Mode", ParamValue::Int(7)).is_err());
        props.set_enum_label("Mode", "Post Transform").unwrap();
        assert_eq!(props.eval_enum("Mode").unwrap(), 1);
        assert!(props.set_enum_label("Mode", "Sideways").is_err());
    }

    #[test]
    fn redeclaring_keeps_position() {
        let mut props = sample();
        props.add("Segments", PropertyKind::Float);
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Size", "Segments", "Mode", "Flip"]);
        assert_eq!(props.get("Segments").unwrap().kind, PropertyKind::Float);
    }
}
