//! 棋子注册表

use std::collections::HashMap;

use crate::constants::PIECES_PER_CAMP;
use crate::piece::{Camp, Piece, PieceId};

/// 房间内的全部棋子，按 ID 索引
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceRegistry {
    pieces: HashMap<PieceId, Piece>,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self {
            pieces: HashMap::with_capacity(PIECES_PER_CAMP * 2),
        }
    }

    /// 加入棋子，ID 重复时返回被替换的旧棋子
    pub fn insert(&mut self, piece: Piece) -> Option<Piece> {
        self.pieces.insert(piece.id.clone(), piece)
    }

    pub fn get(&self, id: &str) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Piece> {
        self.pieces.get_mut(id)
    }

    /// 同时可变借用两枚不同的棋子（攻击方, 防守方）
    pub fn pair_mut(&mut self, first: &str, second: &str) -> Option<(&mut Piece, &mut Piece)> {
        if first == second {
            return None;
        }
        let mut a = None;
        let mut b = None;
        for (id, piece) in self.pieces.iter_mut() {
            if id == first {
                a = Some(piece);
            } else if id == second {
                b = Some(piece);
            }
        }
        a.zip(b)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// 指定阵营是否还有可行棋的棋子（存活、已翻开、非军旗/地雷）
    pub fn has_movable_pieces(&self, camp: Camp) -> bool {
        self.pieces
            .values()
            .any(|p| p.camp == camp && p.is_active())
    }
}

impl FromIterator<Piece> for PieceRegistry {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        let mut registry = Self::new();
        for piece in iter {
            registry.insert(piece);
        }
        registry
    }
}
