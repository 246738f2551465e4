//! 棋盘状态

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_COLS, BOARD_ROWS};
use crate::error::GameError;
use crate::piece::{Piece, PieceId};

/// 棋盘格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// 占据该格的棋子，None 表示空格
    pub piece_id: Option<PieceId>,
    /// 是否可通行（预留，目前规则不使用，始终为 true）
    pub walkable: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            piece_id: None,
            walkable: true,
        }
    }
}

impl Cell {
    /// 是否为空格
    pub fn is_empty(&self) -> bool {
        self.piece_id.is_none()
    }
}

/// 棋盘
///
/// 只保存格子里的棋子 ID，棋子坐标与格子占用的一致性由调用方维护。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// 索引为 y * cols + x
    cells: Vec<Cell>,
}

impl Board {
    /// 创建指定大小的空棋盘
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    /// 创建标准 12x5 空棋盘
    pub fn empty() -> Self {
        Self::new(BOARD_ROWS, BOARD_COLS)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// 检查坐标是否在棋盘内
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.cols && y >= 0 && (y as usize) < self.rows
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GameError> {
        if self.in_bounds(x, y) {
            Ok(y as usize * self.cols + x as usize)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    /// 获取格子
    pub fn cell(&self, x: i32, y: i32) -> Result<&Cell, GameError> {
        let index = self.index(x, y)?;
        Ok(&self.cells[index])
    }

    /// 获取格子中的棋子 ID，越界或空格返回 None
    pub fn piece_at(&self, x: i32, y: i32) -> Option<&PieceId> {
        self.cell(x, y).ok().and_then(|c| c.piece_id.as_ref())
    }

    /// 设置或清空格子中的棋子
    pub fn set_piece(&mut self, x: i32, y: i32, piece_id: Option<PieceId>) -> Result<(), GameError> {
        let index = self.index(x, y)?;
        self.cells[index].piece_id = piece_id;
        Ok(())
    }

    /// 按棋子记录的坐标放置棋子（供开局摆子使用）
    pub fn place(&mut self, piece: &Piece) -> Result<(), GameError> {
        self.set_piece(piece.position.x, piece.position.y, Some(piece.id.clone()))
    }

    /// 按行遍历所有格子，附带坐标
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            ((i % self.cols) as i32, (i / self.cols) as i32, cell)
        })
    }

    /// 被占据的格子数
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}
