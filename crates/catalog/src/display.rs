//! Detail overlay content.
//!
//! Builds the labelled rows shown in a service's detail overlay. Rendering to
//! HTML or a terminal is up to the caller.

use crate::details::Details;
use crate::entity::LocatedEntity;
use seoul_services_geo::format_distance;
use serde::Serialize;

/// How a row value should be presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RowValue {
    Text(String),
    Link(String),
    Image(String),
}

/// One labelled line of overlay content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: RowValue,
}

/// Everything an overlay needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayContent {
    pub entity_id: String,
    pub title: String,
    pub category_label: &'static str,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    pub rows: Vec<DetailRow>,
}

impl OverlayContent {
    /// Builds overlay content for `entity`.
    pub fn for_entity(entity: &LocatedEntity) -> Self {
        let category = entity.category();
        Self {
            entity_id: entity.id.clone(),
            title: entity.name.clone(),
            category_label: category.label(),
            color: category.color(),
            distance: entity.distance.and_then(|d| format_distance(d).ok()),
            rows: detail_rows(entity),
        }
    }
}

#[derive(Default)]
struct Rows(Vec<DetailRow>);

impl Rows {
    fn text(&mut self, label: &'static str, value: Option<&str>) {
        if let Some(value) = non_empty(value) {
            let value = if is_url(value) {
                RowValue::Link(value.to_string())
            } else {
                RowValue::Text(value.to_string())
            };
            self.0.push(DetailRow { label, value });
        }
    }

    fn link(&mut self, label: &'static str, value: Option<&str>) {
        if let Some(value) = non_empty(value) {
            self.0.push(DetailRow {
                label,
                value: RowValue::Link(value.to_string()),
            });
        }
    }

    fn image(&mut self, label: &'static str, value: Option<&str>) {
        if let Some(value) = non_empty(value) {
            self.0.push(DetailRow {
                label,
                value: RowValue::Image(value.to_string()),
            });
        }
    }
}

/// Category-specific rows for `entity`, skipping empty fields.
pub fn detail_rows(entity: &LocatedEntity) -> Vec<DetailRow> {
    let mut rows = Rows::default();
    let name = Some(entity.name.as_str());
    let address = entity.address.as_deref();

    match entity.details() {
        Details::Library(d) => {
            rows.text("도서관명", name);
            rows.text("구명", d.district.as_deref());
            rows.text("주소", address);
            rows.text("전화번호", d.phone.as_deref());
            rows.link("홈페이지", d.homepage.as_deref());
            rows.text("운영시간", d.hours.as_deref());
            rows.text("정기휴관일", d.closed_days.as_deref());
            rows.text("도서관구분", d.library_type.as_deref());
        }
        Details::CulturalSpace(d) => {
            rows.text("주제분류", d.subject.as_deref());
            rows.text("문화시설명", name);
            rows.text("주소", address);
            rows.text("구명", d.district.as_deref());
            rows.text("전화번호", d.phone.as_deref());
            rows.link("홈페이지", d.homepage.as_deref());
            rows.text("관람시간", d.hours.as_deref());
            if matches!(d.is_free.as_deref(), Some("무료" | "N" | "n")) {
                rows.text("관람료", Some("무료"));
            } else {
                rows.text("관람료", d.fee.as_deref());
            }
            rows.text("휴관일", d.closed_days.as_deref());
            rows.text("시설소개", d.description.as_deref());
        }
        Details::PublicReservation(d) => {
            rows.text("대분류", d.major_class.as_deref());
            rows.text("소분류", d.minor_class.as_deref());
            rows.text("서비스상태", d.status.as_deref());
            rows.text("서비스명", name);
            let free = d
                .payment
                .as_deref()
                .is_some_and(|p| p.contains("무료") || p == "N");
            if free {
                rows.text("이용료", Some("무료"));
            } else {
                rows.text("이용료", d.fee.as_deref().or(Some("유료")));
            }
            rows.text("장소명", d.place.as_deref());
            rows.text("서비스대상", d.target.as_deref());
            rows.link("홈페이지", d.url.as_deref());
            rows.text("시작일시", d.receipt_begin.as_deref());
            rows.text("종료일시", d.receipt_end.as_deref());
            rows.text("구명", d.district.as_deref());
            rows.text("상세내용", d.description.as_deref());
            rows.text("전화번호", d.phone.as_deref());
        }
        Details::FutureHeritage(d) => {
            rows.text("미래유산명", name);
            rows.text("구명", d.district.as_deref());
            rows.text("주소", address);
            rows.text("분류명", d.classification.as_deref());
            rows.text("대분류", d.main_category.as_deref());
            rows.text("소분류", d.sub_category.as_deref());
            rows.text("이력사항", d.history.as_deref());
            rows.text("보존필요성", d.preservation.as_deref());
            rows.text("설명문", d.description.as_deref());
            let parking = matches!(d.parking.as_deref(), Some("Y" | "y"));
            rows.text("주차장", Some(if parking { "가능" } else { "불가" }));
            if parking {
                rows.text("주차대수", d.parking_capacity.as_deref());
                rows.text("주차비용", d.parking_fee.as_deref());
                rows.text("주차시간", d.parking_hours.as_deref());
            }
            rows.image("사진", d.image.as_deref());
        }
        Details::CulturalEvent(d) => {
            rows.text("행사명", name);
            rows.text("구명", d.district.as_deref());
            rows.text("장소", d.place.as_deref());
            rows.text("주관", d.organizer.as_deref());
            rows.text("시작일", d.start_date.as_deref());
            rows.text("종료일", d.end_date.as_deref());
            rows.text("이용대상", d.target.as_deref());
            rows.text("이용료", d.is_free.as_deref().or(d.fee.as_deref()));
            rows.text("프로그램", d.program.as_deref());
            rows.link("홈페이지", d.homepage.as_deref());
            rows.image("포스터", d.image.as_deref());
        }
    }

    rows.0
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::{HeritageDetails, LibraryDetails};
    use seoul_services_geo::Coordinate;

    #[test]
    fn test_library_rows_skip_empty() {
        let details = Details::Library(LibraryDetails {
            phone: Some("02-120".into()),
            homepage: Some("https://lib.seoul.go.kr".into()),
            hours: Some("  ".into()),
            ..Default::default()
        });
        let entity = LocatedEntity::new("lib-1", "Seoul Library", Coordinate::new(37.5665, 126.978), details);

        let rows = detail_rows(&entity);
        let labels: Vec<_> = rows.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["도서관명", "전화번호", "홈페이지"]);
        assert_eq!(rows[2].value, RowValue::Link("https://lib.seoul.go.kr".into()));
    }

    #[test]
    fn test_heritage_parking_rows() {
        let details = Details::FutureHeritage(HeritageDetails {
            parking: Some("N".into()),
            parking_fee: Some("2000".into()),
            ..Default::default()
        });
        let entity = LocatedEntity::new("fh-1", "Old Station", Coordinate::new(37.556, 126.972), details);

        let rows = detail_rows(&entity);
        assert!(rows.iter().any(|r| r.label == "주차장" && r.value == RowValue::Text("불가".into())));
        assert!(!rows.iter().any(|r| r.label == "주차비용"));
    }

    #[test]
    fn test_overlay_content() {
        let entity = LocatedEntity::bare("lib-1", crate::Category::Library, "Seoul Library", Coordinate::new(37.5665, 126.978))
            .with_distance(Some(1289.0));
        let content = OverlayContent::for_entity(&entity);

        assert_eq!(content.category_label, "도서관");
        assert_eq!(content.color, "#1971C2");
        assert_eq!(content.distance.as_deref(), Some("1.3km"));
    }
}
