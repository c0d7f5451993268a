mod hyperband;
mod properties;
