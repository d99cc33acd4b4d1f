//! Notification text in the two supported UI languages.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Vi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Policy,
    InsuredPerson,
    PremiumPayment,
    Agent,
    Beneficiary,
    User,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
    Upload,
}

impl Locale {
    /// `vi`, `vi-VN`, `vi_VN` select Vietnamese; anything else is English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or_default();
        if primary.eq_ignore_ascii_case("vi") {
            Locale::Vi
        } else {
            Locale::En
        }
    }

    pub fn entity(self, entity: Entity) -> &'static str {
        match (self, entity) {
            (Locale::En, Entity::Policy) => "policy",
            (Locale::En, Entity::InsuredPerson) => "insured person",
            (Locale::En, Entity::PremiumPayment) => "premium payment",
            (Locale::En, Entity::Agent) => "agent",
            (Locale::En, Entity::Beneficiary) => "beneficiary",
            (Locale::En, Entity::User) => "user",
            (Locale::En, Entity::File) => "file",
            (Locale::Vi, Entity::Policy) => "hợp đồng",
            (Locale::Vi, Entity::InsuredPerson) => "người được bảo hiểm",
            (Locale::Vi, Entity::PremiumPayment) => "khoản đóng phí",
            (Locale::Vi, Entity::Agent) => "đại lý",
            (Locale::Vi, Entity::Beneficiary) => "người thụ hưởng",
            (Locale::Vi, Entity::User) => "người dùng",
            (Locale::Vi, Entity::File) => "tệp",
        }
    }

    fn verb(self, action: Action) -> &'static str {
        match (self, action) {
            (Locale::En, Action::List | Action::Get) => "load",
            (Locale::En, Action::Create) => "create",
            (Locale::En, Action::Update) => "update",
            (Locale::En, Action::Delete) => "delete",
            (Locale::En, Action::Upload) => "upload",
            (Locale::Vi, Action::List | Action::Get) => "tải",
            (Locale::Vi, Action::Create) => "tạo",
            (Locale::Vi, Action::Update) => "cập nhật",
            (Locale::Vi, Action::Delete) => "xóa",
            (Locale::Vi, Action::Upload) => "tải lên",
        }
    }

    pub fn success(self, action: Action, entity: Entity) -> String {
        let noun = self.entity(entity);
        match self {
            Locale::En => {
                let past = match action {
                    Action::List | Action::Get => "loaded",
                    Action::Create => "created",
                    Action::Update => "updated",
                    Action::Delete => "deleted",
                    Action::Upload => "uploaded",
                };
                format!("{} {past} successfully", capitalize(noun))
            }
            Locale::Vi => format!("{} {noun} thành công", capitalize(self.verb(action))),
        }
    }

    pub fn failure(self, action: Action, entity: Entity, detail: &str) -> String {
        let noun = self.entity(entity);
        let verb = self.verb(action);
        match self {
            Locale::En => format!("Could not {verb} {noun}: {detail}"),
            Locale::Vi => format!("Không thể {verb} {noun}: {detail}"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
