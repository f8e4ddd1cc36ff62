use super::WaterSample;

/// Build the diagnostic prompt for one sensor snapshot.
pub fn build_prompt(sample: &WaterSample) -> String {
    format!(
        "You are a water quality expert.\n\
         \n\
         TDS: {tds} ppm\n\
         Temperature: {temperature} °C\n\
         Turbidity: {turbidity} NTU\n\
         pH: {ph}\n\
         \n\
         Provide:\n\
         1. Simple summary\n\
         2. Health risks\n\
         3. Suggested actions\n\
         Keep it under 120 words.\n",
        tds = sample.tds,
        temperature = sample.temperature,
        turbidity = sample.turbidity,
        ph = sample.ph,
    )
}
