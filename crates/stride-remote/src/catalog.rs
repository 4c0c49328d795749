//! Exercise and food names served by the in-process store's search.

use stride_core::config::SearchScope;

const EXERCISES: &[&str] = &[
    "Pushups",
    "Bench Press",
    "Incline Bench Press",
    "Dumbbell Press",
    "Chest Flys",
    "Chest Press Machine",
    "Dips",
    "Archer Pushups",
    "Diamond Pushups",
    "Pullups",
    "Chin-ups",
    "Lat Pulldown",
    "Deadlift",
    "Barbell Rows",
    "Face Pulls",
    "Squats",
    "Front Squats",
    "Goblet Squats",
    "Bulgarian Split Squats",
    "Lunges",
    "Leg Press",
    "Romanian Deadlift",
    "Hip Thrusts",
    "Calf Raises",
    "Overhead Press",
    "Arnold Press",
    "Side Lateral Raises",
    "Z Press",
    "Bicep Curls",
    "Hammer Curls",
    "Skull Crushers",
    "Plank",
    "Side Plank",
    "Crunches",
    "Russian Twists",
    "Mountain Climbers",
    "Running",
    "Sprinting",
    "Jogging",
    "Cycling",
    "Rowing Machine",
    "Jump Rope",
    "Burpees",
    "Jumping Jacks",
    "Box Jumps",
    "Swimming",
    "Yoga",
    "Pilates",
    "Stretching",
    "Foam Rolling",
    "Sun Salutation",
    "Cheerleading",
    "Boxing",
    "Rock Climbing",
    "Kettlebell Swings",
    "Turkish Get Up",
];

const FOODS: &[&str] = &[
    "Chicken Breast",
    "Grilled Chicken",
    "Salmon",
    "Tuna",
    "Egg Whites",
    "Chicken Curry",
    "Paneer (Cottage Cheese)",
    "Lentils (Dal)",
    "Chickpeas (Chana)",
    "Tofu",
    "Greek Yogurt",
    "Milk",
    "Brown Rice",
    "Oats",
    "Quinoa",
    "Idli",
    "Apple",
    "Banana",
    "Spinach",
    "Broccoli",
    "Sweet Potato",
    "Almonds",
    "Whey Protein Scoop",
    "Black Coffee",
    "Green Tea",
    "Avocado",
    "Peanut Butter",
    "Chia Seeds",
    "Blueberries",
    "Cheddar Cheese",
];

/// Searchable name lists.
#[derive(Debug, Clone)]
pub struct Catalog {
    exercises: Vec<String>,
    foods: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            EXERCISES.iter().map(|s| s.to_string()).collect(),
            FOODS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl Catalog {
    pub fn new(exercises: Vec<String>, foods: Vec<String>) -> Self {
        Self { exercises, foods }
    }

    /// Case-insensitive search. Names starting with the query come first,
    /// then names containing it elsewhere; each group keeps catalog order.
    /// With [`SearchScope::All`] exercises precede foods.
    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        match scope {
            SearchScope::Exercise => matching(&self.exercises, &needle),
            SearchScope::Food => matching(&self.foods, &needle),
            SearchScope::All => {
                let mut out = matching(&self.exercises, &needle);
                out.extend(matching(&self.foods, &needle));
                out
            }
        }
    }
}

fn matching(names: &[String], needle: &str) -> Vec<String> {
    let mut prefix = Vec::new();
    let mut inner = Vec::new();
    for name in names {
        let lower = name.to_lowercase();
        if lower.starts_with(needle) {
            prefix.push(name.clone());
        } else if lower.contains(needle) {
            inner.push(name.clone());
        }
    }
    prefix.extend(inner);
    prefix
}
