//! Serde proxies for glam types, used via `#[serde(with = "...")]`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Vec3Def {
    x: f32,
    y: f32,
    z: f32,
}

impl From<Vec3> for Vec3Def {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Def> for Vec3 {
    fn from(def: Vec3Def) -> Self {
        Vec3::new(def.x, def.y, def.z)
    }
}

#[derive(Serialize, Deserialize)]
struct QuatDef {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl From<Quat> for QuatDef {
    fn from(q: Quat) -> Self {
        let [x, y, z, w] = q.to_array();
        Self { x, y, z, w }
    }
}

impl From<QuatDef> for Quat {
    fn from(def: QuatDef) -> Self {
        Quat::from_xyzw(def.x, def.y, def.z, def.w)
    }
}

pub mod vec3 {
    use super::Vec3Def;
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(v: &Vec3, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        Vec3Def::from(*v).serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Vec3, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec3Def::deserialize(d).map(Vec3::from)
    }
}

pub mod quat {
    use super::QuatDef;
    use glam::Quat;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(q: &Quat, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        QuatDef::from(*q).serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Quat, D::Error>
    where
        D: Deserializer<'de>,
    {
        QuatDef::deserialize(d).map(Quat::from)
    }
}
