use serde::Serialize;

use super::scoring::Quadrant;

/// Static display copy for one quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub code: Quadrant,
    pub name: &'static str,
    pub name_en: &'static str,
    pub emoji: &'static str,
    pub definition: &'static str,
    pub warning: &'static str,
    pub mission: &'static str,
    pub color: &'static str,
    /// One-line characterisation embedded in narrative prompts.
    pub summary: &'static str,
}

/// Quadrant whose profile stands in for unrecognised stored codes.
pub const DEFAULT_QUADRANT: Quadrant = Quadrant::HeatDry;

static FIRE_DESERT: Profile = Profile {
    code: Quadrant::HeatDry,
    name: "불꽃 사막형",
    name_en: "Fire Desert",
    emoji: "🔥🌵",
    definition: "불꽃처럼 에너지는 강하지만, 수분과 휴식이 늦게 따라오는 기후대형 몸",
    warning: "과로와 카페인은 사막의 불을 더 키웁니다",
    mission: "물부터 채우고, 속도를 한 단계 낮추세요",
    color: "#E25822",
    summary: "불꽃 사막형 (열+조): 뜨겁고 건조한 체질",
};

static TROPICAL_JUNGLE: Profile = Profile {
    code: Quadrant::HeatDamp,
    name: "열대 정글형",
    name_en: "Tropical Jungle",
    emoji: "🔥🌴",
    definition: "에너지가 넘쳐 흐르지만, 과열과 정체가 쉽게 생기는 기후대형 몸",
    warning: "과식·야식·스트레스는 정글을 더 복잡하게 만듭니다",
    mission: "가볍게 땀을 내고, 몸을 비워내세요",
    color: "#1F8A4C",
    summary: "열대 정글형 (열+습): 뜨겁고 습한 체질",
};

static ARCTIC_SWAMP: Profile = Profile {
    code: Quadrant::ColdDamp,
    name: "북극 늪지형",
    name_en: "Arctic Swamp",
    emoji: "❄️💧",
    definition: "수분은 많지만 흐르지 못해, 차갑게 고여 있는 기후대형 몸",
    warning: "찬 음식과 움직임 부족은 늪을 더 깊게 만듭니다",
    mission: "따뜻한 음식과 가벼운 움직임으로 순환을 시작하세요",
    color: "#4A90E2",
    summary: "북극 늪지형 (한+습): 차갑고 습한 체질",
};

static SIBERIAN_PLATEAU: Profile = Profile {
    code: Quadrant::ColdDry,
    name: "시베리아 고원형",
    name_en: "Siberian Plateau",
    emoji: "❄️🌬",
    definition: "맑고 차분하지만, 쉽게 메마르고 고갈되는 기후대형 몸",
    warning: "수면 부족과 긴장은 고원을 더 차갑게 만듭니다",
    mission: "따뜻함과 충분한 휴식으로 기반을 채우세요",
    color: "#B0BEC5",
    summary: "시베리아 고원형 (한+조): 차갑고 건조한 체질",
};

pub fn lookup(quadrant: Quadrant) -> &'static Profile {
    match quadrant {
        Quadrant::HeatDry => &FIRE_DESERT,
        Quadrant::HeatDamp => &TROPICAL_JUNGLE,
        Quadrant::ColdDamp => &ARCTIC_SWAMP,
        Quadrant::ColdDry => &SIBERIAN_PLATEAU,
    }
}

/// Profile for a stored type code; unknown codes get the default profile.
pub fn for_code(raw: &str) -> &'static Profile {
    lookup(Quadrant::from_code_or_default(raw))
}
