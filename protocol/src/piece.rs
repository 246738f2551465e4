//! 棋子定义

use serde::{Deserialize, Serialize};

/// 棋子 ID
pub type PieceId = String;

/// 棋子类型
///
/// 线上传输使用中文棋子名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    /// 军旗：不可移动，被夺即负
    #[serde(rename = "军旗")]
    Flag,
    /// 地雷：不可移动，只有工兵能排除
    #[serde(rename = "地雷")]
    Mine,
    /// 炸弹：与任何棋子同归于尽
    #[serde(rename = "炸弹")]
    Bomb,
    /// 工兵：最低级的有军衔棋子，可排雷
    #[serde(rename = "工兵")]
    Engineer,
    /// 排长
    #[serde(rename = "排长")]
    Lieutenant,
    /// 连长
    #[serde(rename = "连长")]
    Captain,
    /// 营长
    #[serde(rename = "营长")]
    Major,
    /// 团长
    #[serde(rename = "团长")]
    Colonel,
    /// 旅长
    #[serde(rename = "旅长")]
    Brigadier,
    /// 师长
    #[serde(rename = "师长")]
    MajorGeneral,
    /// 军长
    #[serde(rename = "军长")]
    General,
    /// 司令
    #[serde(rename = "司令")]
    Marshal,
}

impl PieceType {
    /// 全部棋子类型
    pub const ALL: [PieceType; 12] = [
        PieceType::Flag,
        PieceType::Mine,
        PieceType::Bomb,
        PieceType::Engineer,
        PieceType::Lieutenant,
        PieceType::Captain,
        PieceType::Major,
        PieceType::Colonel,
        PieceType::Brigadier,
        PieceType::MajorGeneral,
        PieceType::General,
        PieceType::Marshal,
    ];

    /// 军衔，军旗、地雷、炸弹没有军衔
    ///
    /// 军衔只用于比较大小，战斗规则先按类型分派。
    pub fn rank(&self) -> Option<u8> {
        match self {
            PieceType::Flag | PieceType::Mine | PieceType::Bomb => None,
            PieceType::Engineer => Some(1),
            PieceType::Lieutenant => Some(2),
            PieceType::Captain => Some(3),
            PieceType::Major => Some(4),
            PieceType::Colonel => Some(5),
            PieceType::Brigadier => Some(6),
            PieceType::MajorGeneral => Some(7),
            PieceType::General => Some(8),
            PieceType::Marshal => Some(9),
        }
    }

    /// 是否可以移动（军旗、地雷永不移动）
    pub fn is_movable(&self) -> bool {
        !matches!(self, PieceType::Flag | PieceType::Mine)
    }

    /// 棋子中文名
    pub fn name(&self) -> &'static str {
        match self {
            PieceType::Flag => "军旗",
            PieceType::Mine => "地雷",
            PieceType::Bomb => "炸弹",
            PieceType::Engineer => "工兵",
            PieceType::Lieutenant => "排长",
            PieceType::Captain => "连长",
            PieceType::Major => "营长",
            PieceType::Colonel => "团长",
            PieceType::Brigadier => "旅长",
            PieceType::MajorGeneral => "师长",
            PieceType::General => "军长",
            PieceType::Marshal => "司令",
        }
    }

    /// 从中文名解析
    pub fn from_name(name: &str) -> Option<PieceType> {
        PieceType::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Camp {
    /// 尚未确定（首次翻棋前）
    #[default]
    Unknown,
    /// 红方
    Red,
    /// 蓝方
    Blue,
}

impl Camp {
    /// 获取对方阵营，未知阵营的对方仍是未知
    pub fn opponent(&self) -> Camp {
        match self {
            Camp::Red => Camp::Blue,
            Camp::Blue => Camp::Red,
            Camp::Unknown => Camp::Unknown,
        }
    }

    /// 是否已确定
    pub fn is_known(&self) -> bool {
        *self != Camp::Unknown
    }
}

impl std::fmt::Display for Camp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Camp::Unknown => "unknown",
            Camp::Red => "red",
            Camp::Blue => "blue",
        };
        f.write_str(s)
    }
}

/// 棋盘位置
///
/// 坐标来自客户端，可能为负或越界，由 [`Board`](crate::Board) 负责检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 列
    pub x: i32,
    /// 行
    pub y: i32,
}

impl Position {
    /// 创建新位置
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 曼哈顿距离
    pub fn distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// 转换为 [x, y] 数组（线上格式）
    pub fn to_array(&self) -> [i32; 2] {
        [self.x, self.y]
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 棋子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub piece_type: PieceType,
    /// 创建时确定，翻开前对玩家隐藏
    pub camp: Camp,
    pub position: Position,
    /// 只会从 false 变为 true
    pub flipped: bool,
    /// 只会从 true 变为 false
    pub alive: bool,
}

impl Piece {
    /// 创建新棋子（背面朝上、存活）
    pub fn new(id: impl Into<PieceId>, piece_type: PieceType, camp: Camp, position: Position) -> Self {
        Self {
            id: id.into(),
            piece_type,
            camp,
            position,
            flipped: false,
            alive: true,
        }
    }

    /// 是否可参与行棋：存活、已翻开且类型可移动
    pub fn is_active(&self) -> bool {
        self.alive && self.flipped && self.piece_type.is_movable()
    }
}
