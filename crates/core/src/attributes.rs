use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Byte,
    Int,
    Float,
    String,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl AttributeType {
    pub const ALL: [AttributeType; 9] = [
        AttributeType::Byte,
        AttributeType::Int,
        AttributeType::Float,
        AttributeType::String,
        AttributeType::Vec2,
        AttributeType::Vec3,
        AttributeType::Vec4,
        AttributeType::Mat3,
        AttributeType::Mat4,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Byte => "Byte",
            AttributeType::Int => "Int",
            AttributeType::Float => "Float",
            AttributeType::String => "String",
            AttributeType::Vec2 => "Vec2",
            AttributeType::Vec3 => "Vec3",
            AttributeType::Vec4 => "Vec4",
            AttributeType::Mat3 => "Mat3",
            AttributeType::Mat4 => "Mat4",
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Byte(Vec<u8>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    String(Vec<String>),
    Vec2(Vec<Vec2>),
    Vec3(Vec<Vec3>),
    Vec4(Vec<Vec4>),
    Mat3(Vec<Mat3>),
    Mat4(Vec<Mat4>),
}

impl AttributeData {
    pub fn new(attribute_type: AttributeType, size: usize) -> Self {
        let mut data = match attribute_type {
            AttributeType::Byte => AttributeData::Byte(Vec::new()),
            AttributeType::Int => AttributeData::Int(Vec::new()),
            AttributeType::Float => AttributeData::Float(Vec::new()),
            AttributeType::String => AttributeData::String(Vec::new()),
            AttributeType::Vec2 => AttributeData::Vec2(Vec::new()),
            AttributeType::Vec3 => AttributeData::Vec3(Vec::new()),
            AttributeType::Vec4 => AttributeData::Vec4(Vec::new()),
            AttributeType::Mat3 => AttributeData::Mat3(Vec::new()),
            AttributeType::Mat4 => AttributeData::Mat4(Vec::new()),
        };
        data.resize(size);
        data
    }

    pub fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeData::Byte(_) => AttributeType::Byte,
            AttributeData::Int(_) => AttributeType::Int,
            AttributeData::Float(_) => AttributeType::Float,
            AttributeData::String(_) => AttributeType::String,
            AttributeData::Vec2(_) => AttributeType::Vec2,
            AttributeData::Vec3(_) => AttributeType::Vec3,
            AttributeData::Vec4(_) => AttributeType::Vec4,
            AttributeData::Mat3(_) => AttributeType::Mat3,
            AttributeData::Mat4(_) => AttributeType::Mat4,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeData::Byte(v) => v.len(),
            AttributeData::Int(v) => v.len(),
            AttributeData::Float(v) => v.len(),
            AttributeData::String(v) => v.len(),
            AttributeData::Vec2(v) => v.len(),
            AttributeData::Vec3(v) => v.len(),
            AttributeData::Vec4(v) => v.len(),
            AttributeData::Mat3(v) => v.len(),
            AttributeData::Mat4(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resize(&mut self, size: usize) {
        match self {
            AttributeData::Byte(v) => v.resize(size, 0),
            AttributeData::Int(v) => v.resize(size, 0),
            AttributeData::Float(v) => v.resize(size, 0.0),
            AttributeData::String(v) => v.resize(size, String::new()),
            AttributeData::Vec2(v) => v.resize(size, Vec2::ZERO),
            AttributeData::Vec3(v) => v.resize(size, Vec3::ZERO),
            AttributeData::Vec4(v) => v.resize(size, Vec4::ZERO),
            AttributeData::Mat3(v) => v.resize(size, Mat3::IDENTITY),
            AttributeData::Mat4(v) => v.resize(size, Mat4::IDENTITY),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    data: AttributeData,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType, size: usize) -> Self {
        Self {
            name: name.into(),
            data: AttributeData::new(attribute_type, size),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_type(&self) -> AttributeType {
        self.data.attribute_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn resize(&mut self, size: usize) {
        self.data.resize(size);
    }

    pub fn data(&self) -> &AttributeData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut AttributeData {
        &mut self.data
    }

    pub fn as_float(&self) -> Option<&[f32]> {
        match &self.data {
            AttributeData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float_mut(&mut self) -> Option<&mut [f32]> {
        match &mut self.data {
            AttributeData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<&[Vec3]> {
        match &self.data {
            AttributeData::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3_mut(&mut self) -> Option<&mut [Vec3]> {
        match &mut self.data {
            AttributeData::Vec3(v) => Some(v),
            _ => None,
        }
    }
}

/// Named, typed per-element arrays. Lookup is keyed by name and type, so
/// "color" as Vec3 and "color" as Vec4 are distinct attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, attribute_type: AttributeType) -> Option<&Attribute> {
        self.items
            .iter()
            .find(|a| a.name == name && a.attribute_type() == attribute_type)
    }

    pub fn get_mut(&mut self, name: &str, attribute_type: AttributeType) -> Option<&mut Attribute> {
        self.items
            .iter_mut()
            .find(|a| a.name == name && a.attribute_type() == attribute_type)
    }

    pub fn contains(&self, name: &str, attribute_type: AttributeType) -> bool {
        self.get(name, attribute_type).is_some()
    }

    /// Returns the existing attribute (resized to `size`) when one with the
    /// same name and type is present, otherwise creates it.
    pub fn add(&mut self, name: &str, attribute_type: AttributeType, size: usize) -> &mut Attribute {
        let index = match self
            .items
            .iter()
            .position(|a| a.name == name && a.attribute_type() == attribute_type)
        {
            Some(index) => {
                self.items[index].resize(size);
                index
            }
            None => {
                self.items.push(Attribute::new(name, attribute_type, size));
                self.items.len() - 1
            }
        };
        &mut self.items[index]
    }

    pub fn remove(&mut self, name: &str, attribute_type: AttributeType) -> Option<Attribute> {
        let index = self
            .items
            .iter()
            .position(|a| a.name == name && a.attribute_type() == attribute_type)?;
        Some(self.items.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
