mod capture;
mod upload;
