/// Built-in exercise names used until a catalog has ever been fetched.
pub const FALLBACK_EXERCISES: &[&str] = &[
    "Abdominal Crunch Machine",
    "Back Extension",
    "Bench Press",
    "Biceps Curl",
    "Calf Raise",
    "Chest Press",
    "Chin-up",
    "Deadlift",
    "Dip",
    "Hip Abduction",
    "Hip Adduction",
    "Lat Pulldown",
    "Lateral Raise",
    "Leg Curl",
    "Leg Extension",
    "Leg Press",
    "Neck Flexion",
    "Overhead Press",
    "Pec Fly",
    "Pullover",
    "Rear Delt Fly",
    "Seated Row",
    "Shrug",
    "Squat",
    "Triceps Extension",
];

pub fn fallback_exercises() -> Vec<String> {
    super::normalize_names(FALLBACK_EXERCISES)
}
