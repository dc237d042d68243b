//! RocketRegistry — одна owning-таблица живых ракет
//!
//! # Architecture
//! - Generational slots: `RocketId { index, generation }`, освобождённый slot
//!   получает новый generation, старые id больше никогда не резолвятся
//! - Одна строка = body handle + drawable handle + impact флаг
//! - Вторичный индекс body → id для collision processing

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::ports::{BodyHandle, DrawableHandle};

/// Стабильный id ракеты на всё время её жизни
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RocketId {
    index: u32,
    generation: u32,
}

impl RocketId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for RocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rocket#{}v{}", self.index, self.generation)
    }
}

/// Строка реестра
#[derive(Debug, Clone, PartialEq)]
pub struct RocketEntry {
    pub body: BodyHandle,
    pub drawable: DrawableHandle,
    /// true после первого засчитанного impact (дальше контакты игнорируются)
    pub impacted: bool,
    pub spawned_at: Duration,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<RocketEntry>,
}

#[derive(Debug, Default)]
pub struct RocketRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_body: HashMap<BodyHandle, RocketId>,
    len: usize,
}

impl RocketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: BodyHandle, drawable: DrawableHandle, spawned_at: Duration) -> RocketId {
        let entry = RocketEntry {
            body,
            drawable,
            impacted: false,
            spawned_at,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                RocketId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                RocketId { index, generation: 0 }
            }
        };

        self.by_body.insert(body, id);
        self.len += 1;
        id
    }

    /// Удаляет строку; stale id → None
    pub fn remove(&mut self, id: RocketId) -> Option<RocketEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;

        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.by_body.remove(&entry.body);
        self.len -= 1;
        Some(entry)
    }

    pub fn get(&self, id: RocketId) -> Option<&RocketEntry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: RocketId) -> Option<&mut RocketEntry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub fn by_body(&self, body: BodyHandle) -> Option<RocketId> {
        self.by_body.get(&body).copied()
    }

    pub fn is_rocket_body(&self, body: BodyHandle) -> bool {
        self.by_body.contains_key(&body)
    }

    pub fn contains(&self, id: RocketId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Живые ракеты в порядке slot index (детерминированно)
    pub fn iter(&self) -> impl Iterator<Item = (RocketId, &RocketEntry)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|entry| {
                (
                    RocketId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    entry,
                )
            })
        })
    }

    pub fn ids(&self) -> Vec<RocketId> {
        self.iter().map(|(id, _)| id).collect()
    }
}
