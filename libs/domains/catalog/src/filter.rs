//! Typed filter predicates and progressive relaxation.

use sea_orm::{ColumnTrait, Condition};
use std::cmp::Ordering;

use crate::entity::course::Column;
use crate::models::{Course, CourseFilter};

/// Upper bound on courses returned by a filter or the popular fallback
pub const FILTER_RESULT_CAP: u64 = 30;

const RATING_STEP: f64 = 0.5;
const PRICE_STEP: f64 = 100.0;
const DURATION_STEP: i32 = 10;

/// A single predicate over course attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Category(String),
    Subcategory(String),
    TopicContains(String),
    Language(String),
    IsPaid(bool),
    MinRating(f64),
    MaxPrice(f64),
    MinDuration(i32),
    MaxDuration(i32),
}

impl Constraint {
    /// Name of the filter field this constraint comes from.
    pub fn field(&self) -> &'static str {
        match self {
            Constraint::Category(_) => "category",
            Constraint::Subcategory(_) => "subcategory",
            Constraint::TopicContains(_) => "topic",
            Constraint::Language(_) => "language",
            Constraint::IsPaid(_) => "is_paid",
            Constraint::MinRating(_) => "min_rating",
            Constraint::MaxPrice(_) => "max_price",
            Constraint::MinDuration(_) => "min_duration",
            Constraint::MaxDuration(_) => "max_duration",
        }
    }

    /// A filter holding only this constraint.
    pub fn alone(&self) -> CourseFilter {
        let mut filter = CourseFilter::default();
        match self {
            Constraint::Category(v) => filter.category = Some(v.clone()),
            Constraint::Subcategory(v) => filter.subcategory = Some(v.clone()),
            Constraint::TopicContains(v) => filter.topic = Some(v.clone()),
            Constraint::Language(v) => filter.language = Some(v.clone()),
            Constraint::IsPaid(v) => filter.is_paid = Some(*v),
            Constraint::MinRating(v) => filter.min_rating = Some(*v),
            Constraint::MaxPrice(v) => filter.max_price = Some(*v),
            Constraint::MinDuration(v) => filter.min_duration = Some(*v),
            Constraint::MaxDuration(v) => filter.max_duration = Some(*v),
        }
        filter
    }

    /// Rows whose attribute is NULL never satisfy a constraint on it.
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            Constraint::Category(v) => course.category.as_deref() == Some(v.as_str()),
            Constraint::Subcategory(v) => course.subcategory.as_deref() == Some(v.as_str()),
            Constraint::TopicContains(v) => {
                course.topic.as_deref().is_some_and(|topic| topic.contains(v.as_str()))
            }
            Constraint::Language(v) => course.language.as_deref() == Some(v.as_str()),
            Constraint::IsPaid(v) => course.is_paid == *v,
            Constraint::MinRating(v) => course.avg_rating.is_some_and(|r| r >= *v),
            Constraint::MaxPrice(v) => course.price.is_some_and(|p| p <= *v),
            Constraint::MinDuration(v) => course.content_length_min.is_some_and(|d| d >= *v),
            Constraint::MaxDuration(v) => course.content_length_min.is_some_and(|d| d <= *v),
        }
    }

    fn add_to(&self, condition: Condition) -> Condition {
        match self {
            Constraint::Category(v) => condition.add(Column::Category.eq(v.as_str())),
            Constraint::Subcategory(v) => condition.add(Column::Subcategory.eq(v.as_str())),
            Constraint::TopicContains(v) => condition.add(Column::Topic.contains(v.as_str())),
            Constraint::Language(v) => condition.add(Column::Language.eq(v.as_str())),
            Constraint::IsPaid(v) => condition.add(Column::IsPaid.eq(*v)),
            Constraint::MinRating(v) => condition.add(Column::AvgRating.gte(*v)),
            Constraint::MaxPrice(v) => condition.add(Column::Price.lte(*v)),
            Constraint::MinDuration(v) => condition.add(Column::ContentLengthMin.gte(*v)),
            Constraint::MaxDuration(v) => condition.add(Column::ContentLengthMin.lte(*v)),
        }
    }
}

impl CourseFilter {
    /// Drop fields that impose no constraint: blank strings and zero lower bounds.
    pub fn normalized(&self) -> CourseFilter {
        fn text(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        CourseFilter {
            category: text(&self.category),
            subcategory: text(&self.subcategory),
            topic: text(&self.topic),
            language: text(&self.language),
            is_paid: self.is_paid,
            min_rating: self.min_rating.filter(|v| *v > 0.0),
            max_price: self.max_price,
            min_duration: self.min_duration.filter(|v| *v > 0),
            max_duration: self.max_duration,
        }
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        let mut constraints = Vec::new();
        if let Some(v) = &self.category {
            constraints.push(Constraint::Category(v.clone()));
        }
        if let Some(v) = &self.subcategory {
            constraints.push(Constraint::Subcategory(v.clone()));
        }
        if let Some(v) = &self.topic {
            constraints.push(Constraint::TopicContains(v.clone()));
        }
        if let Some(v) = &self.language {
            constraints.push(Constraint::Language(v.clone()));
        }
        if let Some(v) = self.is_paid {
            constraints.push(Constraint::IsPaid(v));
        }
        if let Some(v) = self.min_rating {
            constraints.push(Constraint::MinRating(v));
        }
        if let Some(v) = self.max_price {
            constraints.push(Constraint::MaxPrice(v));
        }
        if let Some(v) = self.min_duration {
            constraints.push(Constraint::MinDuration(v));
        }
        if let Some(v) = self.max_duration {
            constraints.push(Constraint::MaxDuration(v));
        }
        constraints
    }

    /// Conjunction of every constraint, for SQL.
    pub fn to_condition(&self) -> Condition {
        self.constraints()
            .iter()
            .fold(Condition::all(), |condition, c| c.add_to(condition))
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.constraints().iter().all(|c| c.matches(course))
    }
}

/// One loosening step, applied cumulatively in [`RelaxationRule::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationRule {
    LowerMinRating,
    RaiseMaxPrice,
    LowerMinDuration,
    DropSubcategory,
    DropCategory,
    DropLanguage,
    DropIsPaid,
}

impl RelaxationRule {
    pub const ORDER: [RelaxationRule; 7] = [
        RelaxationRule::LowerMinRating,
        RelaxationRule::RaiseMaxPrice,
        RelaxationRule::LowerMinDuration,
        RelaxationRule::DropSubcategory,
        RelaxationRule::DropCategory,
        RelaxationRule::DropLanguage,
        RelaxationRule::DropIsPaid,
    ];

    /// Loosen `filter` in place. Returns a description of the change, or
    /// `None` when the rule had nothing to relax.
    pub fn apply(self, filter: &mut CourseFilter) -> Option<String> {
        match self {
            RelaxationRule::LowerMinRating => {
                let current = filter.min_rating?;
                let lowered = (current - RATING_STEP).max(0.0);
                filter.min_rating = Some(lowered).filter(|v| *v > 0.0);
                Some(format!("min_rating lowered from {} to {}", current, lowered))
            }
            RelaxationRule::RaiseMaxPrice => {
                let current = filter.max_price?;
                let raised = current + PRICE_STEP;
                filter.max_price = Some(raised);
                Some(format!("max_price raised from {} to {}", current, raised))
            }
            RelaxationRule::LowerMinDuration => {
                let current = filter.min_duration?;
                let lowered = (current - DURATION_STEP).max(0);
                filter.min_duration = Some(lowered).filter(|v| *v > 0);
                Some(format!("min_duration lowered from {} to {}", current, lowered))
            }
            RelaxationRule::DropSubcategory => filter
                .subcategory
                .take()
                .map(|v| format!("subcategory '{}' removed", v)),
            RelaxationRule::DropCategory => filter
                .category
                .take()
                .map(|v| format!("category '{}' removed", v)),
            RelaxationRule::DropLanguage => filter
                .language
                .take()
                .map(|v| format!("language '{}' removed", v)),
            RelaxationRule::DropIsPaid => filter
                .is_paid
                .take()
                .map(|v| format!("is_paid={} removed", v)),
        }
    }
}

/// Highest rating first, then most subscribers. NULLs sort last.
pub fn rank_order(a: &Course, b: &Course) -> Ordering {
    desc_nulls_last(a.avg_rating, b.avg_rating, f64::total_cmp)
        .then_with(|| popularity_order(a, b))
}

/// Most subscribers first. NULLs sort last.
pub fn popularity_order(a: &Course, b: &Course) -> Ordering {
    desc_nulls_last(a.num_subscribers, b.num_subscribers, |x, y| x.cmp(y))
}

fn desc_nulls_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&y, &x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course_id::CourseId;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn course(id: i64, rating: Option<f64>, subscribers: Option<i32>) -> Course {
        Course {
            avg_rating: rating,
            num_subscribers: subscribers,
            ..Course::new(CourseId::from_i64(id), format!("Course {}", id))
        }
    }

    #[test]
    fn test_normalized_drops_blank_and_zero_bounds() {
        let filter = CourseFilter {
            category: Some("  ".to_string()),
            language: Some(" English ".to_string()),
            min_rating: Some(0.0),
            min_duration: Some(0),
            max_price: Some(0.0),
            ..Default::default()
        }
        .normalized();

        assert_eq!(filter.category, None);
        assert_eq!(filter.language.as_deref(), Some("English"));
        assert_eq!(filter.min_rating, None);
        assert_eq!(filter.min_duration, None);
        assert_eq!(filter.max_price, Some(0.0));
    }

    #[test]
    fn test_constraints_conjunction() {
        let filter = CourseFilter {
            category: Some("Development".to_string()),
            topic: Some("Rust".to_string()),
            min_rating: Some(4.0),
            max_duration: Some(300),
            ..Default::default()
        };

        let hit = Course {
            category: Some("Development".to_string()),
            topic: Some("Advanced Rust".to_string()),
            avg_rating: Some(4.5),
            content_length_min: Some(240),
            ..Course::new(CourseId::from_i64(1), "hit")
        };
        let low_rating = Course {
            avg_rating: Some(3.9),
            ..hit.clone()
        };
        let no_duration = Course {
            content_length_min: None,
            ..hit.clone()
        };

        assert!(filter.matches(&hit));
        assert!(!filter.matches(&low_rating));
        assert!(!filter.matches(&no_duration));
        assert!(CourseFilter::default().matches(&no_duration));
    }

    #[test]
    fn test_to_condition_builds_sql_predicates() {
        let filter = CourseFilter {
            category: Some("Development".to_string()),
            topic: Some("Rust".to_string()),
            is_paid: Some(false),
            min_rating: Some(4.0),
            ..Default::default()
        };

        let sql = crate::entity::course::Entity::find()
            .filter(filter.to_condition())
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""courses"."category" = 'Development'"#), "{}", sql);
        assert!(sql.contains(r#""courses"."topic" LIKE '%Rust%'"#), "{}", sql);
        assert!(sql.contains(r#""courses"."is_paid" = FALSE"#), "{}", sql);
        assert!(sql.contains(r#""courses"."avg_rating" >="#), "{}", sql);
    }

    #[test]
    fn test_relaxation_rules_are_cumulative() {
        let mut filter = CourseFilter {
            category: Some("Development".to_string()),
            min_rating: Some(0.3),
            max_price: Some(20.0),
            min_duration: Some(15),
            ..Default::default()
        };

        let steps: Vec<String> = RelaxationRule::ORDER
            .iter()
            .filter_map(|rule| rule.apply(&mut filter))
            .collect();

        assert_eq!(
            steps,
            vec![
                "min_rating lowered from 0.3 to 0".to_string(),
                "max_price raised from 20 to 120".to_string(),
                "min_duration lowered from 15 to 5".to_string(),
                "category 'Development' removed".to_string(),
            ]
        );
        assert_eq!(filter.min_rating, None);
        assert_eq!(filter.max_price, Some(120.0));
        assert_eq!(filter.min_duration, Some(5));
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_rules_without_target_do_nothing() {
        let mut filter = CourseFilter::default();
        for rule in RelaxationRule::ORDER {
            assert_eq!(rule.apply(&mut filter), None);
        }
        assert_eq!(filter, CourseFilter::default());
    }

    #[test]
    fn test_constraint_alone_keeps_only_its_field() {
        let filter = CourseFilter {
            category: Some("Design".to_string()),
            max_price: Some(20.0),
            ..Default::default()
        };

        let singles: Vec<(&str, CourseFilter)> = filter
            .constraints()
            .iter()
            .map(|c| (c.field(), c.alone()))
            .collect();

        assert_eq!(singles.len(), 2);
        assert_eq!(singles[0].0, "category");
        assert_eq!(singles[0].1.constraints(), vec![Constraint::Category("Design".to_string())]);
        assert_eq!(singles[1].0, "max_price");
        assert_eq!(singles[1].1.constraints(), vec![Constraint::MaxPrice(20.0)]);
    }

    #[test]
    fn test_rank_order_rating_then_subscribers_nulls_last() {
        let mut courses = vec![
            course(1, None, Some(10_000)),
            course(2, Some(4.5), Some(10)),
            course(3, Some(4.8), None),
            course(4, Some(4.5), Some(500)),
            course(5, Some(4.5), None),
        ];
        courses.sort_by(rank_order);

        let ids: Vec<&str> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["3.0", "4.0", "2.0", "5.0", "1.0"]);
    }
}
