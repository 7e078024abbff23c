mod image_capture;
mod permission_gate;
mod session;
