use serde::{Deserialize, Serialize};

/// Роль пользователя, приходит из подсистемы авторизации целым числом
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Role {
    Admin,
    Accounting,
    Warehouse,
    TradeConsign,
    Viewer,
}

impl Role {
    /// Числовой идентификатор роли (roleID)
    pub fn id(&self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Accounting => 2,
            Role::Warehouse => 3,
            Role::TradeConsign => 4,
            Role::Viewer => 5,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Accounting),
            3 => Some(Role::Warehouse),
            4 => Some(Role::TradeConsign),
            5 => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Администратор",
            Role::Accounting => "Бухгалтерия",
            Role::Warehouse => "Склад",
            Role::TradeConsign => "Трейд / консигнация",
            Role::Viewer => "Просмотр",
        }
    }

    pub fn all() -> Vec<Role> {
        vec![
            Role::Admin,
            Role::Accounting,
            Role::Warehouse,
            Role::TradeConsign,
            Role::Viewer,
        ]
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Role::from_id(value).ok_or_else(|| format!("Unknown role id: {}", value))
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.id()
    }
}

/// Сессия, которую отдаёт подсистема авторизации.
/// Процесс возврата сам сессиями не управляет, только читает их.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "roleID")]
    pub role_id: i32,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}

impl SessionInfo {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }
}
